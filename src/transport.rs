//! The transport contract from §6: one reliable, message-oriented,
//! bidirectional channel per neighbor, established at startup and keyed
//! by the neighbor's address, where each read yields exactly one
//! self-contained message.
//!
//! This is the one piece of the spec explicitly named an external
//! collaborator rather than core logic, but the process still needs a
//! concrete instantiation of it to run. It is implemented here as a Unix
//! domain socket per neighbor, framed with newline-delimited JSON, behind
//! the same `Decoder`/`Encoder` seam the teacher's `session/codec.rs`
//! uses for its (very different) BGP TLV framing.

use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, BytesMut};
use tokio::net::UnixStream;
use tokio_util::codec::{Decoder, Encoder, Framed};

use crate::addr::Address;
use crate::message::Envelope;

/// Frames newline-delimited JSON envelopes over a byte stream.
#[derive(Debug, Default)]
pub struct EnvelopeCodec;

impl Decoder for EnvelopeCodec {
    type Item = Envelope;
    type Error = std::io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> std::io::Result<Option<Envelope>> {
        let Some(newline_at) = buf.iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };
        let line = buf.split_to(newline_at);
        buf.advance(1); // drop the newline itself
        let text = String::from_utf8_lossy(&line);
        let envelope = text
            .parse::<Envelope>()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(Some(envelope))
    }
}

impl Encoder<Envelope> for EnvelopeCodec {
    type Error = std::io::Error;

    fn encode(&mut self, envelope: Envelope, buf: &mut BytesMut) -> std::io::Result<()> {
        let line = envelope.to_json_line();
        buf.reserve(line.len() + 1);
        buf.put_slice(line.as_bytes());
        buf.put_u8(b'\n');
        Ok(())
    }
}

pub type NeighborLink = Framed<UnixStream, EnvelopeCodec>;

/// Where the channel for a given neighbor handle lives. A neighbor's
/// address, not its meaning, determines the socket: the transport is kept
/// entirely independent of relationship/routing semantics.
pub fn socket_path(base_dir: &Path, handle: Address) -> PathBuf {
    base_dir.join(format!("bgprtr-{handle}.sock"))
}

/// Connect to every configured neighbor's socket, in the order given at
/// startup. Fails with the underlying `io::Error` (surfaced by the caller
/// as `RouterError::TransportError`) if any neighbor's socket isn't
/// reachable yet.
pub async fn connect_all(
    base_dir: &Path,
    handles: impl Iterator<Item = Address>,
) -> std::io::Result<Vec<(Address, NeighborLink)>> {
    let mut links = Vec::new();
    for handle in handles {
        let path = socket_path(base_dir, handle);
        let stream = UnixStream::connect(&path).await?;
        links.push((handle, Framed::new(stream, EnvelopeCodec)));
    }
    Ok(links)
}
