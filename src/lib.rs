#![deny(missing_docs)]

//! A networked in-memory key-value store.
//!
//! A server owns a string-to-string map and answers PUT/GET/DELETE request
//! lines sent by a client over either TCP or UDP. Both socket models sit
//! behind the [`Transport`] trait: a stream session carries length-prefixed
//! frames, while the datagram side replies to whichever address it last
//! heard from. Requests carry a client-assigned id that the server echoes
//! back, letting the client discard unsolicited replies under unreliable
//! delivery.

mod client;
mod error;
/// Text wire protocol: request/response lines and their validation.
pub mod protocol;
mod server;
mod store;
mod transport;

pub use client::{KvClient, Reply};
pub use error::{KvError, Result};
pub use server::KvServer;
pub use store::KvStore;
pub use transport::{DatagramTransport, Protocol, StreamTransport, Transport};
