pub mod addr;
pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod neighbor;
pub mod propagate;
pub mod relationship;
pub mod rib;
pub mod router;
pub mod select;
pub mod transport;
