//! CIDR aggregation: coalesce adjacent, attribute-equal routes into a
//! single covering supernet, repeating to a full fixed point.
//!
//! Disaggregation is never implemented directly — a revoke mutates the
//! RIB and this is simply rerun from scratch over the pruned entry list.

use itertools::Itertools;

use crate::rib::RouteEntry;

/// Produce the coalesced view of `entries`. Independent of the order in
/// which mergeable pairs are discovered, because merging a pair commutes
/// with any other merge that shares no input — but the grouping below
/// still has to search within groups in a fixed order for this particular
/// implementation's result to be deterministic across equal inputs, which
/// the RIB's insertion-order-preserving snapshot guarantees.
pub fn aggregate(entries: &[RouteEntry]) -> Vec<RouteEntry> {
    let mut current: Vec<RouteEntry> = entries.to_vec();
    while let Some((i, j)) = find_mergeable_pair(&current) {
        let merged = current[i].prefix.merge(&current[j].prefix);
        let mut next = current.clone();
        // Remove the higher index first so the lower index stays valid.
        next.remove(j);
        let mut entry = next.remove(i);
        entry.prefix = merged;
        next.insert(i, entry);
        current = next;
    }
    current
}

/// Group entries by their attribute key first (cheaper than checking every
/// pair in the whole list) then search each group in list order for the
/// first adjacent pair.
fn find_mergeable_pair(entries: &[RouteEntry]) -> Option<(usize, usize)> {
    let indices: Vec<usize> = (0..entries.len()).collect();
    for group in indices
        .into_iter()
        .into_group_map_by(|&i| attribute_key(&entries[i]))
        .into_values()
    {
        for (a, &i) in group.iter().enumerate() {
            for &j in &group[a + 1..] {
                if entries[i].prefix.adjacent_to(&entries[j].prefix) {
                    return Some(if i < j { (i, j) } else { (j, i) });
                }
            }
        }
    }
    None
}

type AttributeKey = (
    crate::addr::Address,
    u32,
    u8,
    Vec<u32>,
    crate::message::Origin,
    bool,
);

fn attribute_key(e: &RouteEntry) -> AttributeKey {
    (
        e.next_hop,
        e.localpref,
        e.prefix.len(),
        e.as_path.clone(),
        e.origin,
        e.self_origin,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::{Mask, Prefix};
    use crate::message::Origin;
    use pretty_assertions::assert_eq;

    fn entry(network: &str, len: u8, next_hop: &str) -> RouteEntry {
        RouteEntry {
            prefix: Prefix::new(network.parse().unwrap(), Mask::from_len(len)),
            next_hop: next_hop.parse().unwrap(),
            localpref: 100,
            self_origin: false,
            as_path: vec![1],
            origin: Origin::Egp,
        }
    }

    #[test]
    fn coalesces_two_adjacent_equal_routes() {
        let entries = vec![
            entry("192.168.0.0", 24, "192.168.0.2"),
            entry("192.168.1.0", 24, "192.168.0.2"),
        ];
        let result = aggregate(&entries);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].prefix.to_string(), "192.168.0.0/23");
    }

    #[test]
    fn reaches_full_fixed_point_across_a_chain_of_four() {
        let entries = vec![
            entry("192.168.0.0", 24, "192.168.0.2"),
            entry("192.168.1.0", 24, "192.168.0.2"),
            entry("192.168.2.0", 24, "192.168.0.2"),
            entry("192.168.3.0", 24, "192.168.0.2"),
        ];
        let result = aggregate(&entries);
        assert_eq!(
            result.len(),
            1,
            "a full chain of four /24s should collapse to one /22"
        );
        assert_eq!(result[0].prefix.to_string(), "192.168.0.0/22");
    }

    #[test]
    fn does_not_merge_attribute_unequal_routes() {
        let mut b = entry("192.168.1.0", 24, "192.168.0.2");
        b.localpref = 200;
        let entries = vec![entry("192.168.0.0", 24, "192.168.0.2"), b];
        let result = aggregate(&entries);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn is_a_fixed_point_on_its_own_output() {
        let entries = vec![
            entry("192.168.0.0", 24, "192.168.0.2"),
            entry("192.168.1.0", 24, "192.168.0.2"),
        ];
        let once = aggregate(&entries);
        let twice = aggregate(&once);
        assert_eq!(once, twice);
    }
}
