//! The Gao-Rexford export rule (§4.5): export to a peer or provider only
//! what was learned from a customer. AS-path is mutated on update export
//! only, never on revoke export — see the REDESIGN FLAGS.

use crate::addr::Address;
use crate::message::{Envelope, MessageBody, UpdateBody, WithdrawnPrefix};
use crate::neighbor::NeighborTable;
use crate::relationship::permits;

/// Neighbors (excluding `source`) that must be told about something
/// learned from `source`, per the customer-relationship export rule.
pub fn export_targets(source: Address, neighbors: &NeighborTable) -> Vec<Address> {
    let source_rel = match neighbors.relationship(source) {
        Some(rel) => rel,
        None => return Vec::new(),
    };
    neighbors
        .handles()
        .filter(|&n| n != source)
        .filter(|&n| {
            let rel = neighbors
                .relationship(n)
                .expect("handle came from this table");
            permits(source_rel, rel)
        })
        .collect()
}

/// Build the outbound update envelopes for every export target, with the
/// local AS appended to the AS-path and `src` rewritten to the router's
/// own address on the link toward each target.
pub fn propagate_update(
    local_as: u32,
    source: Address,
    body: &UpdateBody,
    neighbors: &NeighborTable,
) -> Vec<Envelope> {
    export_targets(source, neighbors)
        .into_iter()
        .map(|target| {
            let mut as_path = body.as_path.clone();
            as_path.push(local_as);
            let outbound = UpdateBody {
                network: body.network.clone(),
                netmask: body.netmask.clone(),
                localpref: body.localpref,
                as_path,
                origin: body.origin,
                self_origin: body.self_origin,
            };
            Envelope::new(target.router_side(), target, MessageBody::Update(outbound))
        })
        .collect()
}

/// Build the outbound revoke envelopes for every export target, carrying
/// the withdrawn prefixes unmodified — no AS-path mutation on this path.
pub fn propagate_revoke(
    source: Address,
    withdrawn: &[WithdrawnPrefix],
    neighbors: &NeighborTable,
) -> Vec<Envelope> {
    export_targets(source, neighbors)
        .into_iter()
        .map(|target| {
            Envelope::new(
                target.router_side(),
                target,
                MessageBody::Revoke(withdrawn.to_vec()),
            )
        })
        .collect()
}
