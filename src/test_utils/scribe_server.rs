//! Minimal scribe collector listening on a loopback TCP port.

use std::{
    io,
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::scribe_handler::protocol::{
    LogRequest, ResultCode, frame_payload, read_frame, serialise_reply, write_frame,
};

const MAX_FRAME: usize = 1 << 20;

/// Collector that decodes `Log` requests and answers with a fixed code.
///
/// Every received `(category, message)` pair is forwarded to a channel the
/// test reads with [`recv`](Self::recv). With `frames_per_connection` set,
/// the server hangs up after that many requests, forcing a reconnect.
pub struct ScribeTestServer {
    addr: SocketAddr,
    received: Receiver<(String, String)>,
    connections: Arc<AtomicUsize>,
}

impl ScribeTestServer {
    /// Start a server replying `OK` on every connection.
    pub fn start() -> io::Result<Self> {
        Self::start_with(ResultCode::Ok, None)
    }

    pub fn start_with(reply: ResultCode, frames_per_connection: Option<usize>) -> io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let addr = listener.local_addr()?;
        let (tx, received) = unbounded();
        let connections = Arc::new(AtomicUsize::new(0));
        let accepted = Arc::clone(&connections);
        thread::Builder::new()
            .name("scribe-test-server".into())
            .spawn(move || {
                for stream in listener.incoming() {
                    let Ok(stream) = stream else { break };
                    accepted.fetch_add(1, Ordering::SeqCst);
                    let tx = tx.clone();
                    thread::spawn(move || serve(stream, &tx, reply, frames_per_connection));
                }
            })?;
        Ok(Self {
            addr,
            received,
            connections,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `host:port` string for this server.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Next `(category, message)` pair, if one arrives within `timeout`.
    pub fn recv(&self, timeout: Duration) -> Option<(String, String)> {
        self.received.recv_timeout(timeout).ok()
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

fn serve(
    mut stream: TcpStream,
    tx: &Sender<(String, String)>,
    reply: ResultCode,
    frames_per_connection: Option<usize>,
) {
    let mut served = 0usize;
    while let Ok(payload) = read_frame(&mut stream, MAX_FRAME) {
        let Ok(request) = rmp_serde::from_slice::<LogRequest<'_>>(&payload) else {
            return;
        };
        if reply == ResultCode::Ok {
            for message in request.messages {
                let _ = tx.send((message.category.into_owned(), message.message.into_owned()));
            }
        }
        let Some(frame) = serialise_reply(reply)
            .ok()
            .and_then(|bytes| frame_payload(&bytes, MAX_FRAME))
        else {
            return;
        };
        if write_frame(&mut stream, &frame).is_err() {
            return;
        }
        served += 1;
        if frames_per_connection.is_some_and(|limit| served >= limit) {
            return;
        }
    }
}
