//! The authoritative routing information base: the ordered list of learned
//! route entries, plus the announcement archive that lets the aggregated
//! view be rebuilt without replaying neighbors.

use chrono::{DateTime, Utc};
use log::debug;

use crate::addr::{Address, Prefix};
use crate::message::{Origin, UpdateBody, WithdrawnPrefix};

/// One learned route, carrying the five selection attributes from §3.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    pub prefix: Prefix,
    pub next_hop: Address,
    pub localpref: u32,
    pub self_origin: bool,
    pub as_path: Vec<u32>,
    pub origin: Origin,
}

impl RouteEntry {
    pub fn from_update(
        next_hop: Address,
        update: &UpdateBody,
    ) -> Result<Self, crate::error::RouterError> {
        Ok(RouteEntry {
            prefix: update.prefix()?,
            next_hop,
            localpref: update.localpref,
            self_origin: update.self_origin,
            as_path: update.as_path.clone(),
            origin: update.origin,
        })
    }

    /// Two entries are attribute-equal iff they share next-hop, localpref,
    /// mask length, AS-path, origin, and self-origin flag.
    pub fn attribute_equal(&self, other: &RouteEntry) -> bool {
        self.next_hop == other.next_hop
            && self.localpref == other.localpref
            && self.prefix.len() == other.prefix.len()
            && self.as_path == other.as_path
            && self.origin == other.origin
            && self.self_origin == other.self_origin
    }
}

// Retained verbatim per §3's "Announcement archive"; only `archive_iter`
// reads it back today; the full bodies and timestamps are kept for the
// soft-reconfiguration/deaggregation-audit features the spec's own design
// notes call out as future work.
#[derive(Debug, Clone)]
#[allow(dead_code)]
enum Announcement {
    Update {
        neighbor: Address,
        body: UpdateBody,
    },
    Revoke {
        neighbor: Address,
        withdrawn: Vec<WithdrawnPrefix>,
    },
}

#[allow(dead_code)]
struct ArchivedAnnouncement {
    at: DateTime<Utc>,
    announcement: Announcement,
}

/// Ordered route-entry list plus the full inbound announcement archive.
///
/// Insertion order is preserved end-to-end: the spec's tie-break cascade
/// does not depend on RIB order, but the aggregator's determinism does
/// depend on a stable iteration order surviving into the snapshot.
pub struct Rib {
    entries: Vec<RouteEntry>,
    archive: Vec<ArchivedAnnouncement>,
}

impl Rib {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            archive: Vec::new(),
        }
    }

    /// Append an entry derived from an inbound update and archive the
    /// update itself.
    pub fn apply_update(
        &mut self,
        neighbor: Address,
        body: UpdateBody,
    ) -> Result<(), crate::error::RouterError> {
        let entry = RouteEntry::from_update(neighbor, &body)?;
        debug!("RIB: learned {} via {}", entry.prefix, neighbor);
        self.entries.push(entry);
        self.archive.push(ArchivedAnnouncement {
            at: Utc::now(),
            announcement: Announcement::Update { neighbor, body },
        });
        Ok(())
    }

    /// Remove every RIB entry whose (prefix, next-hop) equals (w, neighbor)
    /// for each withdrawn prefix, and archive the revoke.
    pub fn apply_revoke(
        &mut self,
        neighbor: Address,
        withdrawn: Vec<WithdrawnPrefix>,
    ) -> Result<(), crate::error::RouterError> {
        let mut prefixes = Vec::with_capacity(withdrawn.len());
        for w in &withdrawn {
            prefixes.push(w.prefix()?);
        }
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.next_hop == neighbor && prefixes.contains(&e.prefix)));
        debug!(
            "RIB: withdrew {} entries from {}",
            before - self.entries.len(),
            neighbor
        );
        self.archive.push(ArchivedAnnouncement {
            at: Utc::now(),
            announcement: Announcement::Revoke {
                neighbor,
                withdrawn,
            },
        });
        Ok(())
    }

    /// A stable-order snapshot of all currently held entries, for the
    /// aggregator to consume.
    pub fn snapshot(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn archive_len(&self) -> usize {
        self.archive.len()
    }

    /// Replay the archive in arrival order as `(neighbor, is_update)`
    /// pairs, for debug inspection only — the spec's own design note
    /// scopes readers of the archive beyond this out.
    pub fn archive_iter(&self) -> impl Iterator<Item = (Address, bool)> + '_ {
        self.archive.iter().map(|a| match &a.announcement {
            Announcement::Update { neighbor, .. } => (*neighbor, true),
            Announcement::Revoke { neighbor, .. } => (*neighbor, false),
        })
    }
}

impl Default for Rib {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn update(network: &str, netmask: &str) -> UpdateBody {
        UpdateBody {
            network: network.to_string(),
            netmask: netmask.to_string(),
            localpref: 100,
            as_path: vec![1],
            origin: Origin::Egp,
            self_origin: false,
        }
    }

    #[test]
    fn revoke_removes_exact_prefix_next_hop_pair() {
        let mut rib = Rib::new();
        let a: Address = "192.168.0.2".parse().unwrap();
        rib.apply_update(a, update("192.168.0.0", "255.255.255.0"))
            .unwrap();
        assert_eq!(rib.snapshot().len(), 1);

        rib.apply_revoke(
            a,
            vec![WithdrawnPrefix {
                network: "192.168.0.0".to_string(),
                netmask: "255.255.255.0".to_string(),
            }],
        )
        .unwrap();
        assert_eq!(rib.snapshot().len(), 0);
        assert_eq!(rib.archive_len(), 2);
    }

    #[test]
    fn revoke_requires_matching_next_hop() {
        let mut rib = Rib::new();
        let a: Address = "192.168.0.2".parse().unwrap();
        let b: Address = "172.16.0.2".parse().unwrap();
        rib.apply_update(a, update("192.168.0.0", "255.255.255.0"))
            .unwrap();
        rib.apply_revoke(
            b,
            vec![WithdrawnPrefix {
                network: "192.168.0.0".to_string(),
                netmask: "255.255.255.0".to_string(),
            }],
        )
        .unwrap();
        assert_eq!(
            rib.snapshot().len(),
            1,
            "withdraw from wrong neighbor must not remove the route"
        );
    }

    #[test]
    fn preserves_insertion_order() {
        let mut rib = Rib::new();
        let a: Address = "192.168.0.2".parse().unwrap();
        rib.apply_update(a, update("192.168.1.0", "255.255.255.0"))
            .unwrap();
        rib.apply_update(a, update("192.168.0.0", "255.255.255.0"))
            .unwrap();
        let nets: Vec<String> = rib
            .snapshot()
            .iter()
            .map(|e| e.prefix.to_string())
            .collect();
        assert_eq!(nets, vec!["192.168.1.0/24", "192.168.0.0/24"]);
    }
}
