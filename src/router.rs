//! The event loop (§4.7, §5): single-threaded, cooperative, multiplexes
//! every neighbor channel, dispatches one message at a time, and exits
//! cleanly on the first EOF or transport error from any channel.

use std::collections::HashMap;
use std::path::Path;

use futures::stream::{select_all, SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{error, info, warn};

use crate::addr::Address;
use crate::dispatch::Router;
use crate::error::RouterError;
use crate::message::Envelope;
use crate::transport::{connect_all, NeighborLink};

type LinkSink = SplitSink<NeighborLink, Envelope>;
type LinkStream = SplitStream<NeighborLink>;

/// One item off the combined, tagged stream: either a message (or read
/// error) from a neighbor, or the synthetic end-of-stream marker chained
/// onto every neighbor's stream so its closing is observable alongside
/// everyone else's traffic.
type TaggedItem = (Address, Option<std::io::Result<Envelope>>);

/// Connect to every configured neighbor and run the event loop until a
/// channel closes, a channel read fails, or the process receives
/// `SIGINT`/`SIGTERM`.
pub async fn serve(base_dir: &Path, mut router: Router) -> Result<(), RouterError> {
    let handles: Vec<Address> = router.neighbors().handles().collect();
    let links = connect_all(base_dir, handles.into_iter()).await?;
    info!("connected to {} neighbor(s)", links.len());

    let mut sinks: HashMap<Address, LinkSink> = HashMap::with_capacity(links.len());
    let mut tagged_streams = Vec::with_capacity(links.len());
    for (handle, link) in links {
        let (sink, stream) = link.split();
        sinks.insert(handle, sink);
        tagged_streams.push(tag_with_eof_marker(handle, stream));
    }
    let mut combined = select_all(tagged_streams);

    loop {
        tokio::select! {
            item = combined.next() => {
                match item {
                    Some((neighbor, Some(Ok(envelope)))) => {
                        let outbound = router.dispatch(neighbor, envelope);
                        for out in outbound {
                            send(&mut sinks, out.channel, out.envelope).await;
                        }
                    }
                    Some((neighbor, Some(Err(err)))) => {
                        error!("transport error on channel {neighbor}: {err}");
                        return Err(RouterError::TransportError(err));
                    }
                    Some((neighbor, None)) => {
                        info!("channel {neighbor} closed (EOF); shutting down");
                        return Ok(());
                    }
                    None => {
                        info!("all neighbor channels closed; shutting down");
                        return Ok(());
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal; exiting cleanly");
                return Ok(());
            }
        }
    }
}

fn tag_with_eof_marker(
    handle: Address,
    stream: LinkStream,
) -> impl futures::Stream<Item = TaggedItem> {
    let tagged = stream.map(move |res| (handle, Some(res)));
    let eof_marker = futures::stream::once(futures::future::ready((handle, None)));
    tagged.chain(eof_marker)
}

async fn send(sinks: &mut HashMap<Address, LinkSink>, channel: Address, envelope: Envelope) {
    match sinks.get_mut(&channel) {
        Some(sink) => {
            if let Err(err) = sink.send(envelope).await {
                warn!("failed to send to {channel}: {err}");
            }
        }
        None => warn!("no channel open for neighbor {channel}, dropping outbound message"),
    }
}
