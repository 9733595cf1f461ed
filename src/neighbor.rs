//! The fixed set of directly connected neighbors and their relationships,
//! established once at startup and never mutated afterward.

use std::collections::HashMap;
use std::str::FromStr;

use crate::addr::Address;
use crate::error::RouterError;
use crate::relationship::Relationship;

/// One `<neighbor-address>-<relationship>` startup token, parsed.
#[derive(Debug, Clone, Copy)]
pub struct NeighborSpec {
    pub handle: Address,
    pub relationship: Relationship,
}

impl FromStr for NeighborSpec {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, rel) = s.rsplit_once('-').ok_or_else(|| {
            RouterError::MalformedAddress(format!("malformed neighbor token {s:?}"))
        })?;
        Ok(NeighborSpec {
            handle: addr.parse()?,
            relationship: rel.parse()?,
        })
    }
}

/// Read-only lookup table from neighbor handle to relationship, fixed for
/// the lifetime of the process.
#[derive(Debug, Clone)]
pub struct NeighborTable {
    relationships: HashMap<Address, Relationship>,
    order: Vec<Address>,
}

impl NeighborTable {
    pub fn from_specs(specs: &[NeighborSpec]) -> Result<Self, RouterError> {
        let mut relationships = HashMap::with_capacity(specs.len());
        let mut order = Vec::with_capacity(specs.len());
        for spec in specs {
            if relationships
                .insert(spec.handle, spec.relationship)
                .is_some()
            {
                return Err(RouterError::MalformedAddress(format!(
                    "duplicate neighbor {}",
                    spec.handle
                )));
            }
            order.push(spec.handle);
        }
        Ok(Self {
            relationships,
            order,
        })
    }

    pub fn relationship(&self, handle: Address) -> Option<Relationship> {
        self.relationships.get(&handle).copied()
    }

    /// Neighbor handles in the order they were given at startup.
    pub fn handles(&self) -> impl Iterator<Item = Address> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
