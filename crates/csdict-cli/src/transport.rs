//! Control connection transport.
//!
//! [`Connector`] is the seam between the session and the network: the TCP
//! implementation resolves the host, connects with a bounded timeout and
//! applies the read timeout, while tests substitute in-memory streams.
//! [`Connection`] owns one stream for its whole life; closing means dropping
//! it.

use std::io::{self, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use csdict_config::Config;
use csdict_protocol::{Reply, ReplyError, ReplyReader, Request, StatusLine};

/// Connect and per-read timeouts for a control connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Timeouts {
    pub(crate) connect: Duration,
    pub(crate) read: Duration,
}

impl From<&Config> for Timeouts {
    fn from(config: &Config) -> Self {
        Self {
            connect: config.connect_timeout(),
            read: config.read_timeout(),
        }
    }
}

/// Opens byte streams to a server.
pub(crate) trait Connector {
    type Stream: Read + Write;

    fn connect(&self, host: &str, port: u16, timeouts: Timeouts) -> io::Result<Self::Stream>;
}

/// Connector backed by blocking `std::net` TCP sockets.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, host: &str, port: u16, timeouts: Timeouts) -> io::Result<TcpStream> {
        let address = resolve_tcp_address(host, port)?;
        let stream = if timeouts.connect.is_zero() {
            TcpStream::connect(address)?
        } else {
            TcpStream::connect_timeout(&address, timeouts.connect)?
        };
        // A zero duration is rejected by `set_read_timeout`; treat it as "block".
        let read_timeout = Some(timeouts.read).filter(|timeout| !timeout.is_zero());
        stream.set_read_timeout(read_timeout)?;
        Ok(stream)
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

/// A live control connection.
pub(crate) struct Connection<S> {
    reader: ReplyReader<BufReader<S>>,
}

impl<S: Read + Write> Connection<S> {
    pub(crate) fn new(stream: S) -> Self {
        Self {
            reader: ReplyReader::new(BufReader::new(stream)),
        }
    }

    pub(crate) fn send(&mut self, request: &Request) -> io::Result<()> {
        request.write_to(self.reader.get_mut().get_mut())
    }

    pub(crate) fn read_status(&mut self) -> Result<StatusLine, ReplyError> {
        self.reader.read_status()
    }

    pub(crate) fn read_reply(&mut self) -> Result<Reply, ReplyError> {
        self.reader.read_reply()
    }
}
