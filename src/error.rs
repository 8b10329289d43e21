use std::io;

use thiserror::Error;

/// Error type for kvlite operations.
#[derive(Error, Debug)]
pub enum KvError {
    /// Socket-level IO failure.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No message arrived within the read deadline.
    #[error("receive timed out")]
    Timeout,

    /// The peer closed the connection, or no session is established.
    #[error("peer disconnected")]
    Disconnected,

    /// A request line that fails grammar validation.
    ///
    /// The message is the usage text sent back to the client verbatim.
    #[error("{0}")]
    Protocol(String),

    /// A datagram send was attempted before any peer address was known.
    #[error("no destination address specified")]
    NoPeer,

    /// A message too large to fit in a single datagram.
    #[error("message of {size} bytes exceeds the {limit} byte datagram limit")]
    MessageTooLarge {
        /// Size of the rejected message in bytes.
        size: usize,
        /// Largest payload a single datagram may carry.
        limit: usize,
    },
}

/// Result type alias for kvlite operations.
pub type Result<T> = std::result::Result<T, KvError>;
