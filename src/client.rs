use log::{debug, warn};

use crate::protocol;
use crate::transport::Transport;
use crate::{KvError, Result};

/// Outcome of one request round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The solicited response's result text.
    Answer(String),
    /// A response arrived whose id does not match the pending request; it is
    /// discarded, not retried.
    Unsolicited,
    /// No response arrived within the read deadline; the request is
    /// abandoned.
    TimedOut,
}

/// The client of the key-value store.
///
/// Prefixes every outgoing request with a strictly increasing id and accepts
/// a response only when it echoes the id of the request just sent, so a late
/// or stray reply can never be mistaken for the pending answer.
pub struct KvClient<T: Transport> {
    transport: T,
    next_id: u64,
}

impl<T: Transport> KvClient<T> {
    /// Creates a client over a transport; call [`KvClient::start`] before
    /// the first request.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_id: 0,
        }
    }

    /// Establishes the transport session and arms its read deadline.
    pub fn start(&mut self) -> Result<()> {
        self.transport.start()
    }

    /// Sends one request line and waits for its response.
    ///
    /// The id counter advances on every call, whatever the outcome, so ids
    /// stay strictly increasing across timeouts and failures.
    pub fn request(&mut self, text: &str) -> Result<Reply> {
        let id = self.next_id;
        self.next_id += 1;

        let line = protocol::encode_request(id, text);
        self.transport.send(&line)?;
        debug!(target: self.transport.tag(), "Sent to server: {line}");

        match self.transport.receive() {
            Ok(response) => match protocol::match_response(&response, id) {
                Some(result) => Ok(Reply::Answer(result.to_owned())),
                None => {
                    warn!(
                        target: self.transport.tag(),
                        "Received unsolicited response of length {} from server",
                        response.len()
                    );
                    Ok(Reply::Unsolicited)
                }
            },
            Err(KvError::Timeout) => {
                warn!(
                    target: self.transport.tag(),
                    "Server response timeout. Moving to next request..."
                );
                Ok(Reply::TimedOut)
            }
            Err(e) => Err(e),
        }
    }

    /// Closes the underlying transport.
    pub fn close(&mut self) -> Result<()> {
        self.transport.close()
    }
}
