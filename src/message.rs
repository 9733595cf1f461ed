//! The JSON message envelope and the six message shapes it carries (§6).
//!
//! Each inbound message is modeled as a tagged variant over the six
//! types; decoding rejects unknown tags up front rather than deferring
//! the failure to the dispatcher.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::addr::{Address, Mask, Prefix};
use crate::error::RouterError;

/// Declared in preference order (IGP best); the derived `Ord` is the
/// preference ordering step 5 of the selector sorts on directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Origin {
    #[serde(rename = "IGP")]
    Igp,
    #[serde(rename = "EGP")]
    Egp,
    #[serde(rename = "UNK")]
    Unk,
}

fn prefix_fields(network: &str, netmask: &str) -> Result<Prefix, RouterError> {
    let network: Address = network.parse()?;
    let mask: Mask = netmask.parse()?;
    Ok(Prefix::new(network, mask))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateBody {
    pub network: String,
    pub netmask: String,
    pub localpref: u32,
    #[serde(rename = "ASPath")]
    pub as_path: Vec<u32>,
    pub origin: Origin,
    #[serde(rename = "selfOrigin")]
    pub self_origin: bool,
}

impl UpdateBody {
    pub fn prefix(&self) -> Result<Prefix, RouterError> {
        prefix_fields(&self.network, &self.netmask)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WithdrawnPrefix {
    pub network: String,
    pub netmask: String,
}

impl WithdrawnPrefix {
    pub fn prefix(&self) -> Result<Prefix, RouterError> {
        prefix_fields(&self.network, &self.netmask)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableEntry {
    pub network: String,
    pub netmask: String,
    pub peer: String,
}

/// The decoded body of an inbound or outbound message, keyed by the
/// envelope's `type` tag.
#[derive(Debug, Clone)]
pub enum MessageBody {
    Update(UpdateBody),
    Revoke(Vec<WithdrawnPrefix>),
    Data(Value),
    NoRoute,
    Dump,
    Table(Vec<TableEntry>),
}

impl MessageBody {
    pub fn type_tag(&self) -> &'static str {
        match self {
            MessageBody::Update(_) => "update",
            MessageBody::Revoke(_) => "revoke",
            MessageBody::Data(_) => "data",
            MessageBody::NoRoute => "no route",
            MessageBody::Dump => "dump",
            MessageBody::Table(_) => "table",
        }
    }

    fn to_value(&self) -> Value {
        match self {
            MessageBody::Update(u) => serde_json::to_value(u).expect("UpdateBody serializes"),
            MessageBody::Revoke(w) => serde_json::to_value(w).expect("withdrawals serialize"),
            MessageBody::Data(v) => v.clone(),
            MessageBody::NoRoute => Value::Object(Default::default()),
            MessageBody::Dump => Value::Object(Default::default()),
            MessageBody::Table(t) => serde_json::to_value(t).expect("table entries serialize"),
        }
    }

    fn from_tagged(tag: &str, msg: Value) -> Result<Self, RouterError> {
        match tag {
            "update" => Ok(MessageBody::Update(
                serde_json::from_value(msg).map_err(|e| RouterError::UnknownType(e.to_string()))?,
            )),
            "revoke" => Ok(MessageBody::Revoke(
                serde_json::from_value(msg).map_err(|e| RouterError::UnknownType(e.to_string()))?,
            )),
            "data" => Ok(MessageBody::Data(msg)),
            "no route" => Ok(MessageBody::NoRoute),
            "dump" => Ok(MessageBody::Dump),
            "table" => Ok(MessageBody::Table(
                serde_json::from_value(msg).map_err(|e| RouterError::UnknownType(e.to_string()))?,
            )),
            other => Err(RouterError::UnknownType(other.to_string())),
        }
    }
}

/// The wire-level `{src, dst, type, msg}` object, decoded in two passes:
/// first the envelope shape with `msg` left generic, then the body
/// according to `type`.
#[derive(Debug, Deserialize, Serialize)]
struct RawEnvelope {
    src: Address,
    dst: Address,
    #[serde(rename = "type")]
    kind: String,
    msg: Value,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    pub src: Address,
    pub dst: Address,
    pub body: MessageBody,
}

impl Envelope {
    pub fn new(src: Address, dst: Address, body: MessageBody) -> Self {
        Self { src, dst, body }
    }

    pub fn to_json_line(&self) -> String {
        let raw = RawEnvelope {
            src: self.src,
            dst: self.dst,
            kind: self.body.type_tag().to_string(),
            msg: self.body.to_value(),
        };
        serde_json::to_string(&raw).expect("Envelope serializes")
    }
}

impl FromStr for Envelope {
    type Err = RouterError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let raw: RawEnvelope =
            serde_json::from_str(line).map_err(|e| RouterError::UnknownType(e.to_string()))?;
        let body = MessageBody::from_tagged(&raw.kind, raw.msg)?;
        Ok(Envelope {
            src: raw.src,
            dst: raw.dst,
            body,
        })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}]", self.src, self.dst, self.body.type_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn roundtrips_update() {
        let line = r#"{"src":"192.168.0.2","dst":"192.168.0.1","type":"update","msg":{"network":"192.168.0.0","netmask":"255.255.255.0","localpref":100,"ASPath":[1],"origin":"EGP","selfOrigin":false}}"#;
        let env: Envelope = line.parse().unwrap();
        match &env.body {
            MessageBody::Update(u) => {
                assert_eq!(u.localpref, 100);
                assert_eq!(u.as_path, vec![1]);
                assert_eq!(u.origin, Origin::Egp);
            }
            _ => panic!("expected update"),
        }
        let back: Envelope = env.to_json_line().parse().unwrap();
        assert_eq!(back.src, env.src);
    }

    #[test]
    fn rejects_unknown_type() {
        let line = r#"{"src":"1.2.3.4","dst":"1.2.3.1","type":"bogus","msg":{}}"#;
        assert!(line.parse::<Envelope>().is_err());
    }

    #[test]
    fn origin_derives_igp_first_ordering() {
        assert!(Origin::Igp < Origin::Egp);
        assert!(Origin::Egp < Origin::Unk);
    }
}
