//! The parse- and transport-level error kinds from the error handling
//! design (§7). The selector's `NoRoute`/`PolicyReject` outcomes are not
//! represented here — they are not failures to propagate, but two routine
//! dispatch results (see `select::Outcome`), so they live there instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("malformed address: {0:?}")]
    MalformedAddress(String),

    #[error("unknown message type: {0:?}")]
    UnknownType(String),

    #[error("transport error: {0}")]
    TransportError(#[from] std::io::Error),
}
