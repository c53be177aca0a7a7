//! Transport primitives for the scribe handler.

use std::{
    fmt,
    io::{self, Read, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    path::PathBuf,
    time::Duration,
};

use native_tls::{TlsConnector, TlsStream};

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// Transport used to reach the collector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SocketTransport {
    /// TCP transport with optional TLS.
    Tcp(TcpTransport),
    /// Unix domain socket transport.
    Unix(UnixTransport),
}

impl SocketTransport {
    /// Parse a `host:port` address into a plain TCP transport.
    ///
    /// Bracketed IPv6 literals (`[::1]:1463`) are accepted.
    pub fn parse_address(address: &str) -> Option<Self> {
        let (host, port) = address.trim().rsplit_once(':')?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return None;
        }
        let port = port.parse().ok()?;
        Some(SocketTransport::Tcp(TcpTransport {
            host: host.to_owned(),
            port,
            tls: None,
        }))
    }
}

impl fmt::Display for SocketTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketTransport::Tcp(tcp) if tcp.host.contains(':') => {
                write!(f, "[{}]:{}", tcp.host, tcp.port)
            }
            SocketTransport::Tcp(tcp) => write!(f, "{}:{}", tcp.host, tcp.port),
            SocketTransport::Unix(unix) => write!(f, "unix:{}", unix.path.display()),
        }
    }
}

/// TCP transport configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TcpTransport {
    /// Hostname or IP address to connect to.
    pub host: String,
    /// TCP port number.
    pub port: u16,
    /// Optional TLS configuration.
    pub tls: Option<TlsOptions>,
}

impl TcpTransport {
    fn socket_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map(|iter| iter.collect())
    }
}

/// Unix domain socket configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnixTransport {
    /// Path to the socket file.
    pub path: PathBuf,
}

/// TLS connection options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsOptions {
    /// Domain name presented during the TLS handshake.
    pub domain: String,
    /// Skip certificate validation when true (intended for tests).
    pub insecure_skip_verify: bool,
}

impl TlsOptions {
    fn connector(&self) -> io::Result<TlsConnector> {
        let mut builder = TlsConnector::builder();
        if self.insecure_skip_verify {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }
        builder.build().map_err(io::Error::other)
    }
}

/// Active socket connection state.
pub enum ActiveConnection {
    PlainTcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl ActiveConnection {
    /// Apply `timeout` to both reads and writes on the underlying socket.
    pub fn set_io_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        match self {
            ActiveConnection::PlainTcp(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))
            }
            ActiveConnection::Tls(stream) => {
                let tcp = stream.get_ref();
                tcp.set_read_timeout(Some(timeout))?;
                tcp.set_write_timeout(Some(timeout))
            }
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))
            }
        }
    }
}

impl Read for ActiveConnection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ActiveConnection::PlainTcp(stream) => stream.read(buf),
            ActiveConnection::Tls(stream) => stream.read(buf),
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for ActiveConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ActiveConnection::PlainTcp(stream) => stream.write(buf),
            ActiveConnection::Tls(stream) => stream.write(buf),
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ActiveConnection::PlainTcp(stream) => stream.flush(),
            ActiveConnection::Tls(stream) => stream.flush(),
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => stream.flush(),
        }
    }
}

fn connect_tcp(config: &TcpTransport, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in config.socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses resolved for {}:{}", config.host, config.port),
        )
    }))
}

/// Establish a socket connection using the provided transport definition.
pub fn connect_transport(
    transport: &SocketTransport,
    connect_timeout: Duration,
) -> io::Result<ActiveConnection> {
    match transport {
        SocketTransport::Tcp(config) => {
            let stream = connect_tcp(config, connect_timeout)?;
            let Some(tls) = &config.tls else {
                return Ok(ActiveConnection::PlainTcp(stream));
            };
            let connector = tls.connector()?;
            stream.set_read_timeout(Some(connect_timeout))?;
            stream.set_write_timeout(Some(connect_timeout))?;
            let stream = connector
                .connect(&tls.domain, stream)
                .map_err(io::Error::other)?;
            Ok(ActiveConnection::Tls(Box::new(stream)))
        }
        SocketTransport::Unix(config) => {
            #[cfg(unix)]
            {
                let stream = UnixStream::connect(&config.path)?;
                Ok(ActiveConnection::Unix(stream))
            }
            #[cfg(not(unix))]
            {
                let _ = (config, connect_timeout);
                Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "unix domain sockets are not supported on this platform",
                ))
            }
        }
    }
}
