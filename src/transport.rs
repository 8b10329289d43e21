//! Transport layer: one contract over two socket models.
//!
//! A [`StreamTransport`] session is a connected TCP socket carrying
//! length-prefixed frames, so message boundaries survive the byte stream. A
//! [`DatagramTransport`] has no session at all: the server treats whichever
//! address sent the most recent packet as the peer for the next reply. The
//! [`Transport`] trait is what the server and client loops are written
//! against, so neither cares which model sits underneath.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs, UdpSocket};
use std::str::FromStr;
use std::time::Duration;

use log::info;

use crate::{KvError, Result};

/// Read deadline for both transports; a `receive` pending longer than this
/// fails with [`KvError::Timeout`].
pub const READ_TIMEOUT: Duration = Duration::from_millis(5000);

/// Largest payload a single datagram send may carry.
pub const MAX_DATAGRAM: usize = 1000;

/// Receive buffer size for datagrams.
const RECV_BUF: usize = 1024;

/// Upper bound on a length-prefixed stream frame; a corrupt prefix must not
/// turn into an arbitrarily large allocation.
const MAX_FRAME: u32 = 64 * 1024;

/// Selectable wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Connection-oriented transport with framed messages.
    Tcp,
    /// Connectionless transport, one packet per message.
    Udp,
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            _ => Err("Protocol must be one of TCP, UDP.".to_owned()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("TCP"),
            Protocol::Udp => f.write_str("UDP"),
        }
    }
}

/// Common contract over the two socket models.
///
/// `start` must be called before the first `send` or `receive`; it is where
/// a stream blocks for its counterpart and where the read deadline is armed.
pub trait Transport {
    /// Blocks until the counterpart is ready and arms the read deadline.
    ///
    /// A stream server accepts the next connection, dropping any previous
    /// session; a stream client connects to its configured address. A
    /// datagram endpoint has nothing to establish.
    fn start(&mut self) -> Result<()>;

    /// Transmits `message` as one discrete unit.
    fn send(&mut self, message: &str) -> Result<()>;

    /// Blocks until one full message is available or the deadline passes.
    fn receive(&mut self) -> Result<String>;

    /// Releases the underlying sockets. Idempotent.
    fn close(&mut self) -> Result<()>;

    /// Address of the current counterpart, if one is established.
    fn peer_addr(&self) -> Option<SocketAddr>;

    /// Static tag identifying this endpoint in log output.
    fn tag(&self) -> &'static str;
}

/// Maps socket failures onto the transport taxonomy: deadline expiry becomes
/// `Timeout`, a vanished peer becomes `Disconnected`.
fn classify(err: io::Error) -> KvError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => KvError::Timeout,
        io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe => KvError::Disconnected,
        _ => KvError::Io(err),
    }
}

fn invalid_data(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> KvError {
    KvError::Io(io::Error::new(io::ErrorKind::InvalidData, err))
}

enum StreamRole {
    /// Server side: a bound listener whose `start` accepts the next session.
    Listen(TcpListener),
    /// Client side: a target address whose `start` connects.
    Connect(String),
}

/// TCP transport.
///
/// Carries one live session at a time. Each message is framed with a 4-byte
/// big-endian length prefix; arbitrary request text may not be
/// delimiter-safe, so the receiver recovers exact boundaries from the length
/// alone.
pub struct StreamTransport {
    role: Option<StreamRole>,
    stream: Option<TcpStream>,
    tag: &'static str,
}

impl StreamTransport {
    /// Binds a listening socket; `start` accepts the next connection.
    ///
    /// Binding eagerly makes an already-bound port fail at startup instead
    /// of on the first session.
    pub fn server(addr: impl ToSocketAddrs) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        info!(target: "tcp-server", "Listening on {}", listener.local_addr()?);
        Ok(Self {
            role: Some(StreamRole::Listen(listener)),
            stream: None,
            tag: "tcp-server",
        })
    }

    /// Prepares a client for `addr`; `start` performs the connect.
    pub fn client(addr: impl Into<String>) -> Self {
        Self {
            role: Some(StreamRole::Connect(addr.into())),
            stream: None,
            tag: "tcp-client",
        }
    }

    /// Local address of the listening or connected socket.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        if let Some(StreamRole::Listen(listener)) = &self.role {
            return Ok(listener.local_addr()?);
        }
        match &self.stream {
            Some(stream) => Ok(stream.local_addr()?),
            None => Err(KvError::Disconnected),
        }
    }
}

impl Transport for StreamTransport {
    fn start(&mut self) -> Result<()> {
        self.stream = None;
        let stream = match self.role.as_ref().ok_or(KvError::Disconnected)? {
            StreamRole::Listen(listener) => {
                let (stream, peer) = listener.accept()?;
                info!(target: self.tag, "Connected to client at {peer}");
                stream
            }
            StreamRole::Connect(target) => {
                let stream = TcpStream::connect(target.as_str())?;
                info!(target: self.tag, "Connected to {target}");
                stream
            }
        };
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        self.stream = Some(stream);
        Ok(())
    }

    fn send(&mut self, message: &str) -> Result<()> {
        let payload = message.as_bytes();
        if payload.len() > MAX_FRAME as usize {
            return Err(invalid_data(format!(
                "frame of {} bytes exceeds the {MAX_FRAME} byte limit",
                payload.len()
            )));
        }
        let mut frame = Vec::with_capacity(4 + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(payload);

        let stream = self.stream.as_mut().ok_or(KvError::Disconnected)?;
        stream.write_all(&frame).map_err(classify)?;
        stream.flush().map_err(classify)
    }

    fn receive(&mut self) -> Result<String> {
        let stream = self.stream.as_mut().ok_or(KvError::Disconnected)?;

        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).map_err(classify)?;
        let len = u32::from_be_bytes(len_buf);
        if len > MAX_FRAME {
            return Err(invalid_data(format!(
                "frame length {len} exceeds the {MAX_FRAME} byte limit"
            )));
        }

        let mut payload = vec![0u8; len as usize];
        stream.read_exact(&mut payload).map_err(classify)?;
        String::from_utf8(payload).map_err(invalid_data)
    }

    fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            // Best effort: the session may already be gone.
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.role = None;
        Ok(())
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(|s| s.peer_addr().ok())
    }

    fn tag(&self) -> &'static str {
        self.tag
    }
}

/// UDP transport.
///
/// There is no session: the serving side records whichever address sent the
/// most recent packet and uses it as the destination of the next reply. It
/// can only answer a peer it has just heard from, and it cannot address two
/// peers concurrently.
pub struct DatagramTransport {
    socket: Option<UdpSocket>,
    peer: Option<SocketAddr>,
    /// Server side only: refresh `peer` from each packet's source address.
    track_sender: bool,
    tag: &'static str,
}

impl DatagramTransport {
    /// Binds the serving socket. No peer is known until a packet arrives.
    pub fn server(addr: impl ToSocketAddrs) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        info!(target: "udp-server", "Listening on {}", socket.local_addr()?);
        Ok(Self {
            socket: Some(socket),
            peer: None,
            track_sender: true,
            tag: "udp-server",
        })
    }

    /// Binds an ephemeral local socket aimed at the fixed server address.
    pub fn client(addr: impl ToSocketAddrs) -> Result<Self> {
        let peer = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| invalid_data("server address did not resolve"))?;
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        info!(target: "udp-client", "Connected to {peer}");
        Ok(Self {
            socket: Some(socket),
            peer: Some(peer),
            track_sender: false,
            tag: "udp-client",
        })
    }

    /// Local address of the bound socket.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket()?.local_addr()?)
    }

    fn socket(&self) -> Result<&UdpSocket> {
        self.socket.as_ref().ok_or(KvError::Disconnected)
    }
}

impl Transport for DatagramTransport {
    fn start(&mut self) -> Result<()> {
        // No connection phase; only the read deadline needs arming.
        self.socket()?.set_read_timeout(Some(READ_TIMEOUT))?;
        Ok(())
    }

    fn send(&mut self, message: &str) -> Result<()> {
        let payload = message.as_bytes();
        if payload.len() > MAX_DATAGRAM {
            return Err(KvError::MessageTooLarge {
                size: payload.len(),
                limit: MAX_DATAGRAM,
            });
        }
        let peer = self.peer.ok_or(KvError::NoPeer)?;
        self.socket()?.send_to(payload, peer).map_err(classify)?;
        Ok(())
    }

    fn receive(&mut self) -> Result<String> {
        let mut buf = [0u8; RECV_BUF];
        let (len, src) = self.socket()?.recv_from(&mut buf).map_err(classify)?;
        if self.track_sender {
            // The sender of this packet is the destination of the next reply.
            self.peer = Some(src);
        }
        String::from_utf8(buf[..len].to_vec()).map_err(invalid_data)
    }

    fn close(&mut self) -> Result<()> {
        self.socket = None;
        self.peer = None;
        Ok(())
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    fn tag(&self) -> &'static str {
        self.tag
    }
}
