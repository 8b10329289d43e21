use log::{debug, error, info, warn};

use crate::protocol::{self, Command};
use crate::transport::Transport;
use crate::{KvError, KvStore, Result};

/// The server of the key-value store.
///
/// Owns the store and a transport and answers one request at a time. A
/// stream transport serves a single connection until the client hangs up,
/// then goes back to listening; a datagram transport simply answers packets
/// as they arrive, replying to whichever address it last heard from.
pub struct KvServer<T: Transport> {
    transport: T,
    store: KvStore,
}

impl<T: Transport> KvServer<T> {
    /// Creates a server over an already-bound transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            store: KvStore::new(),
        }
    }

    /// Runs the accept/serve loop until the process is killed.
    pub fn run(&mut self) -> Result<()> {
        loop {
            if let Err(e) = self.transport.start() {
                error!(target: self.transport.tag(), "Failed to establish session: {e}");
                continue;
            }
            match self.serve() {
                Ok(()) | Err(KvError::Disconnected) => {
                    info!(target: self.transport.tag(), "Client disconnected")
                }
                Err(e) => error!(target: self.transport.tag(), "Session error: {e}"),
            }
        }
    }

    /// Serves requests until the current session ends.
    fn serve(&mut self) -> Result<()> {
        loop {
            let line = match self.transport.receive() {
                Ok(line) => line,
                Err(KvError::Timeout) => {
                    debug!(target: self.transport.tag(), "Receive timed out, still waiting");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let peer = self.peer_label();
            debug!(target: self.transport.tag(), "Received data from {peer}: {line}");

            let (id, body) = protocol::split_id(&line);
            let result = match Command::parse(body) {
                Ok(command) => self.dispatch(command),
                Err(e) => {
                    warn!(
                        target: self.transport.tag(),
                        "Received malformed request of length {} from {peer}",
                        line.len()
                    );
                    e.to_string()
                }
            };

            let response = protocol::encode_response(id, &result);
            self.transport.send(&response)?;
            debug!(target: self.transport.tag(), "Sent data to {peer}: {response}");
        }
    }

    /// Applies a validated command to the store and renders the result text.
    fn dispatch(&mut self, command: Command) -> String {
        match command {
            Command::Put { key, value } => {
                self.store.put(key, value);
                protocol::OK.to_owned()
            }
            Command::Get { key } => self
                .store
                .get(&key)
                .unwrap_or_else(|| protocol::KEY_NOT_FOUND.to_owned()),
            Command::Delete { key } => match self.store.delete(&key) {
                Some(value) => format!("Deleted value: {value}"),
                None => protocol::KEY_NOT_FOUND.to_owned(),
            },
        }
    }

    fn peer_label(&self) -> String {
        self.transport
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_owned())
    }
}
