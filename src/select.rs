//! Best-path selection: longest-prefix match over the coalesced view,
//! followed by the five-step tie-break cascade and the relationship
//! filter (§4.4).

use crate::addr::Address;
use crate::neighbor::NeighborTable;
use crate::relationship::permits;
use crate::rib::RouteEntry;

/// The two ways a data message can fail to forward, kept distinct because
/// §7 gives them different error kinds even though the recovery (reply
/// "no route") is identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Forward(Address),
    NoRoute,
    PolicyReject,
}

/// Run the full pipeline.
pub fn select(
    coalesced: &[RouteEntry],
    neighbors: &NeighborTable,
    ingress: Address,
    destination: Address,
) -> Outcome {
    // 1. Longest-prefix match.
    let matching: Vec<&RouteEntry> = coalesced
        .iter()
        .filter(|e| e.prefix.matches(destination))
        .collect();
    let Some(max_len) = matching.iter().map(|e| e.prefix.len()).max() else {
        return Outcome::NoRoute;
    };
    let mut survivors: Vec<&RouteEntry> = matching
        .into_iter()
        .filter(|e| e.prefix.len() == max_len)
        .collect();

    // 2. Highest localpref.
    let max_localpref = survivors
        .iter()
        .map(|e| e.localpref)
        .max()
        .expect("nonempty");
    survivors.retain(|e| e.localpref == max_localpref);

    // 3. Self-origin preference.
    if survivors.iter().any(|e| e.self_origin) {
        survivors.retain(|e| e.self_origin);
    }

    // 4. Shortest AS-path.
    let min_as_path_len = survivors
        .iter()
        .map(|e| e.as_path.len())
        .min()
        .expect("nonempty");
    survivors.retain(|e| e.as_path.len() == min_as_path_len);

    // 5. Origin preference: IGP > EGP > UNK, per Origin's declaration-order Ord.
    let best_origin = survivors.iter().map(|e| e.origin).min().expect("nonempty");
    survivors.retain(|e| e.origin == best_origin);

    // 6. Lowest next-hop address.
    let winner = survivors
        .into_iter()
        .min_by_key(|e| e.next_hop)
        .expect("nonempty");

    // 7. Relationship filter: at least one of rel(S), rel(E) must be customer.
    let ingress_rel = neighbors
        .relationship(ingress)
        .expect("ingress is a known neighbor");
    let egress_rel = neighbors
        .relationship(winner.next_hop)
        .expect("RIB next-hops are known neighbors");
    if permits(ingress_rel, egress_rel) {
        Outcome::Forward(winner.next_hop)
    } else {
        Outcome::PolicyReject
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr::{Mask, Prefix};
    use crate::message::Origin;
    use crate::neighbor::NeighborSpec;
    use pretty_assertions::assert_eq;

    fn entry(
        network: &str,
        len: u8,
        next_hop: &str,
        localpref: u32,
        origin: Origin,
        as_path: Vec<u32>,
        self_origin: bool,
    ) -> RouteEntry {
        RouteEntry {
            prefix: Prefix::new(network.parse().unwrap(), Mask::from_len(len)),
            next_hop: next_hop.parse().unwrap(),
            localpref,
            self_origin,
            as_path,
            origin,
        }
    }

    fn neighbors(specs: &[&str]) -> NeighborTable {
        let specs: Vec<NeighborSpec> = specs.iter().map(|s| s.parse().unwrap()).collect();
        NeighborTable::from_specs(&specs).unwrap()
    }

    #[test]
    fn longest_prefix_match_wins_over_shorter_supernet() {
        let table = neighbors(&["192.168.0.2-cust", "172.16.0.2-cust"]);
        let entries = vec![
            entry(
                "192.168.0.0",
                16,
                "192.168.0.2",
                100,
                Origin::Egp,
                vec![1],
                false,
            ),
            entry(
                "192.168.0.0",
                24,
                "172.16.0.2",
                100,
                Origin::Egp,
                vec![1],
                false,
            ),
        ];
        let chosen = select(
            &entries,
            &table,
            "172.16.0.2".parse().unwrap(),
            "192.168.0.25".parse().unwrap(),
        );
        assert_eq!(chosen, Outcome::Forward("172.16.0.2".parse().unwrap()));
    }

    #[test]
    fn tie_break_prefers_igp_origin() {
        let table = neighbors(&["192.168.0.2-cust", "10.0.0.2-cust", "172.16.0.2-cust"]);
        let entries = vec![
            entry(
                "192.168.0.0",
                24,
                "192.168.0.2",
                100,
                Origin::Igp,
                vec![1],
                false,
            ),
            entry(
                "192.168.0.0",
                24,
                "10.0.0.2",
                100,
                Origin::Egp,
                vec![1],
                false,
            ),
        ];
        let chosen = select(
            &entries,
            &table,
            "172.16.0.2".parse().unwrap(),
            "192.168.0.25".parse().unwrap(),
        );
        assert_eq!(chosen, Outcome::Forward("192.168.0.2".parse().unwrap()));
    }

    #[test]
    fn relationship_filter_rejects_peer_to_peer() {
        let table = neighbors(&["192.168.0.2-peer", "172.16.0.2-peer"]);
        let entries = vec![entry(
            "192.168.0.0",
            24,
            "192.168.0.2",
            100,
            Origin::Egp,
            vec![1],
            false,
        )];
        let chosen = select(
            &entries,
            &table,
            "172.16.0.2".parse().unwrap(),
            "192.168.0.25".parse().unwrap(),
        );
        assert_eq!(chosen, Outcome::PolicyReject);
    }

    #[test]
    fn no_match_returns_no_route() {
        let table = neighbors(&["192.168.0.2-cust", "172.16.0.2-cust"]);
        let entries = vec![entry(
            "192.168.0.0",
            24,
            "192.168.0.2",
            100,
            Origin::Egp,
            vec![1],
            false,
        )];
        let chosen = select(
            &entries,
            &table,
            "172.16.0.2".parse().unwrap(),
            "10.0.0.1".parse().unwrap(),
        );
        assert_eq!(chosen, Outcome::NoRoute);
    }
}
