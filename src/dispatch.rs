//! The dispatcher: classifies each inbound message by its type tag and
//! invokes the matching handler (§4.6). Owns the RIB, the coalesced view
//! that is synchronously rebuilt after every mutation, and the fixed
//! neighbor table.

use log::{debug, warn};

use crate::addr::Address;
use crate::aggregate::aggregate;
use crate::message::{Envelope, MessageBody, TableEntry};
use crate::neighbor::NeighborTable;
use crate::propagate::{propagate_revoke, propagate_update};
use crate::rib::{Rib, RouteEntry};
use crate::select::{select, Outcome};

/// One message this router needs to emit, and the neighbor channel it must
/// go out on. The channel is tracked separately from the envelope's own
/// `dst` field because for forwarded data packets the two differ: `dst`
/// is the packet's destination host, not the egress neighbor's handle.
pub struct Outbound {
    pub channel: Address,
    pub envelope: Envelope,
}

impl Outbound {
    fn new(channel: Address, envelope: Envelope) -> Self {
        Self { channel, envelope }
    }
}

/// The router's mutable state: the RIB, the neighbor table (fixed for the
/// process lifetime) and the local AS number used when propagating
/// updates.
pub struct Router {
    local_as: u32,
    neighbors: NeighborTable,
    rib: Rib,
    coalesced: Vec<RouteEntry>,
}

impl Router {
    pub fn new(local_as: u32, neighbors: NeighborTable) -> Self {
        Self {
            local_as,
            neighbors,
            rib: Rib::new(),
            coalesced: Vec::new(),
        }
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    fn rebuild_coalesced(&mut self) {
        self.coalesced = aggregate(self.rib.snapshot());
    }

    /// Handle one inbound message from `ingress` (the neighbor owning the
    /// channel it arrived on, resolved by the event loop — not necessarily
    /// the envelope's `src` field, which for `data` messages names the
    /// original packet's source host). Returns the messages to send, each
    /// tagged with the channel to send it on.
    pub fn dispatch(&mut self, ingress: Address, inbound: Envelope) -> Vec<Outbound> {
        match inbound.body {
            MessageBody::Update(body) => {
                debug!(
                    "dispatch: update from {ingress} for {}/{}",
                    body.network, body.netmask
                );
                match self.rib.apply_update(ingress, body.clone()) {
                    Ok(()) => {
                        self.rebuild_coalesced();
                        propagate_update(self.local_as, ingress, &body, &self.neighbors)
                            .into_iter()
                            .map(|env| Outbound::new(env.dst, env))
                            .collect()
                    }
                    Err(err) => {
                        warn!("dropping malformed update from {ingress}: {err}");
                        Vec::new()
                    }
                }
            }
            MessageBody::Revoke(withdrawn) => {
                debug!(
                    "dispatch: revoke from {ingress} ({} prefixes)",
                    withdrawn.len()
                );
                match self.rib.apply_revoke(ingress, withdrawn.clone()) {
                    Ok(()) => {
                        self.rebuild_coalesced();
                        propagate_revoke(ingress, &withdrawn, &self.neighbors)
                            .into_iter()
                            .map(|env| Outbound::new(env.dst, env))
                            .collect()
                    }
                    Err(err) => {
                        warn!("dropping malformed revoke from {ingress}: {err}");
                        Vec::new()
                    }
                }
            }
            MessageBody::Data(payload) => {
                debug!("dispatch: data from {ingress}, pkt dst {}", inbound.dst);
                match select(&self.coalesced, &self.neighbors, ingress, inbound.dst) {
                    Outcome::Forward(egress) => {
                        let forwarded =
                            Envelope::new(inbound.src, inbound.dst, MessageBody::Data(payload));
                        vec![Outbound::new(egress, forwarded)]
                    }
                    Outcome::NoRoute | Outcome::PolicyReject => {
                        let reply =
                            Envelope::new(ingress.router_side(), inbound.src, MessageBody::NoRoute);
                        vec![Outbound::new(ingress, reply)]
                    }
                }
            }
            MessageBody::Dump => {
                debug!("dispatch: dump requested by {ingress}");
                let table: Vec<TableEntry> = self
                    .coalesced
                    .iter()
                    .map(|e| TableEntry {
                        network: e.prefix.network.to_string(),
                        netmask: e.prefix.mask.to_string(),
                        peer: e.next_hop.to_string(),
                    })
                    .collect();
                let reply = Envelope::new(
                    ingress.router_side(),
                    inbound.src,
                    MessageBody::Table(table),
                );
                vec![Outbound::new(ingress, reply)]
            }
            MessageBody::NoRoute | MessageBody::Table(_) => {
                // Router-generated types received inbound are not part of
                // the spec's handled set; treat as an unrecognized tag.
                warn!("dispatch: unexpected router-generated message type from {ingress}");
                Vec::new()
            }
        }
    }
}
