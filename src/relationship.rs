//! The three commercial relationships, modeled as an enum everywhere past
//! the startup-token boundary parser.

use std::fmt;
use std::str::FromStr;

use crate::error::RouterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    Customer,
    Peer,
    Provider,
}

impl Relationship {
    pub fn is_customer(self) -> bool {
        matches!(self, Relationship::Customer)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Relationship::Customer => "cust",
            Relationship::Peer => "peer",
            Relationship::Provider => "prov",
        };
        write!(f, "{word}")
    }
}

impl FromStr for Relationship {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cust" => Ok(Relationship::Customer),
            "peer" => Ok(Relationship::Peer),
            "prov" => Ok(Relationship::Provider),
            other => Err(RouterError::MalformedAddress(format!(
                "unknown relationship {other:?}"
            ))),
        }
    }
}

/// At least one side of a forwarding/propagation decision must be a
/// customer for it to be permitted.
pub fn permits(a: Relationship, b: Relationship) -> bool {
    a.is_customer() || b.is_customer()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens() {
        assert_eq!(
            "cust".parse::<Relationship>().unwrap(),
            Relationship::Customer
        );
        assert_eq!("peer".parse::<Relationship>().unwrap(), Relationship::Peer);
        assert_eq!(
            "prov".parse::<Relationship>().unwrap(),
            Relationship::Provider
        );
        assert!("bogus".parse::<Relationship>().is_err());
    }

    #[test]
    fn permits_rule() {
        use Relationship::*;
        assert!(permits(Customer, Peer));
        assert!(permits(Peer, Customer));
        assert!(!permits(Peer, Provider));
        assert!(!permits(Provider, Peer));
    }
}
