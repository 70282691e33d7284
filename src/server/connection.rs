use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::counter_engine::CounterStore;
use crate::server::wire::{self, Request};
use crate::utils::decode_hex;

/// Idle connections are dropped after this long without a request.
const READ_TIMEOUT: Duration = Duration::from_secs(120);

/// Upper bound on a single request frame; bounds per-connection memory.
const MAX_REQUEST_LEN: usize = 128;

const OK_REPLY: &str = "+OK\r\n";
const RESET_REPLY: &str = "+1\r\n";

/// Serves one client connection until EOF, timeout, or I/O error.
///
/// Each loop iteration reads one request frame, dispatches it against the
/// store, and writes the reply. Mutations are serialized by the store's own
/// lock; this loop holds no shared state.
pub fn handle(mut stream: TcpStream, store: Arc<CounterStore>) -> io::Result<()> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let peer = stream.peer_addr()?;
    debug!(%peer, "client connected");

    let mut buf = [0u8; MAX_REQUEST_LEN];
    loop {
        let read_len = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => break,
        };
        let frame = String::from_utf8_lossy(&buf[..read_len]);
        let reply = dispatch(&frame, &store);
        stream.write_all(reply.as_bytes())?;
    }

    debug!(%peer, "client disconnected");
    Ok(())
}

/// Maps one parsed request onto a store operation and renders the reply.
///
/// Keys that do not hex-decode to the configured width and unknown field
/// aliases are rejected here, before the store is touched: the offending
/// operation is dropped while the reply stays protocol-successful, and reads
/// report the all-zero snapshot.
fn dispatch(frame: &str, store: &CounterStore) -> String {
    let key_hex_width = store.geometry().key_length * 2;

    match wire::parse(frame, key_hex_width) {
        Request::Increment { key, alias, delta } => {
            match (decode_key(key, store), store.schema().index_of_alias(alias)) {
                (Some(raw_key), Some(field_index)) => {
                    if let Err(e) = store.increment(&raw_key, field_index, delta) {
                        warn!(error = %e, "increment failed");
                    }
                }
                (None, _) => debug!(key, "dropping increment for malformed key"),
                (_, None) => debug!(alias, "dropping increment for unknown field alias"),
            }
            OK_REPLY.to_string()
        }

        Request::Snapshot { key } => {
            let totals = match decode_key(key, store) {
                Some(raw_key) => store.snapshot(&raw_key, false).unwrap_or_else(|e| {
                    warn!(error = %e, "snapshot failed");
                    store.empty_snapshot()
                }),
                None => store.empty_snapshot(),
            };
            let body = serde_json::to_string(&totals).unwrap_or_else(|_| "{}".to_string());
            format!("${}\r\n{}\r\n", body.len(), body)
        }

        Request::Reset { key } => {
            if let Some(raw_key) = decode_key(key, store) {
                if let Err(e) = store.snapshot(&raw_key, true) {
                    warn!(error = %e, "reset failed");
                }
            }
            RESET_REPLY.to_string()
        }

        Request::Unrecognized => OK_REPLY.to_string(),
    }
}

fn decode_key(hex_key: &str, store: &CounterStore) -> Option<Vec<u8>> {
    let raw = decode_hex(hex_key)?;
    (raw.len() == store.geometry().key_length).then_some(raw)
}
