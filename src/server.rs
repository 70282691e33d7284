use std::io;
use std::net::{TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

use crate::counter_engine::CounterStore;

mod connection;
pub mod wire;

/// Binds `listen` and serves counter commands until the process exits.
pub fn serve<A: ToSocketAddrs>(store: Arc<CounterStore>, listen: A) -> io::Result<()> {
    let listener = TcpListener::bind(listen)?;
    serve_listener(store, listener)
}

/// Serves on an already-bound listener. One OS thread per accepted
/// connection; handlers run the store's operations concurrently and the
/// store's internal lock keeps slot accesses consistent.
pub fn serve_listener(store: Arc<CounterStore>, listener: TcpListener) -> io::Result<()> {
    info!(address = %listener.local_addr()?, "serving counter store");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    if let Err(e) = connection::handle(stream, store) {
                        warn!(error = %e, "connection error");
                    }
                });
            }
            Err(e) => {
                // transient accept failures must not take the listener down
                warn!(error = %e, "accept failed");
            }
        }
    }

    Ok(())
}
