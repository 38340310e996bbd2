use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, ErrorKind, Op, Result};
use crate::state::ConnectionState;

/// One end of a TCP byte stream.
///
/// Cloning yields another handle to the same socket. Closing through any
/// handle wakes every read or write pending on the others with a
/// [`ErrorKind::ClosedHandle`] error; the socket itself is released once the
/// last in-flight operation lets go of it, so the peer sees a normal close.
#[derive(Debug, Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
    slot: Mutex<Slot>,
    closing: CancellationToken,
}

#[derive(Debug)]
struct Slot {
    stream: Option<Arc<TcpStream>>,
    state: ConnectionState,
}

impl Connection {
    pub(crate) fn new(stream: TcpStream, local_addr: SocketAddr, peer_addr: SocketAddr) -> Self {
        Connection {
            inner: Arc::new(Inner {
                local_addr,
                peer_addr,
                slot: Mutex::new(Slot {
                    stream: Some(Arc::new(stream)),
                    state: ConnectionState::Open,
                }),
                closing: CancellationToken::new(),
            }),
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.inner.peer_addr
    }

    pub fn state(&self) -> ConnectionState {
        self.slot().state
    }

    /// Reads up to `buf.len()` bytes.
    ///
    /// A graceful close by the peer surfaces as [`Error::EndOfStream`] rather
    /// than `Ok(0)`, unless `buf` is empty.
    pub async fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let stream = self.live_stream(Op::Read)?;
        let wanted = !buf.is_empty();

        let res = tokio::select! {
            biased;
            _ = self.inner.closing.cancelled() => {
                trace!("[{}] pending read interrupted by close", self.inner.local_addr);
                return Err(Error::ClosedHandle { op: Op::Read });
            }
            res = read_ready(&stream, buf) => res,
        };

        match res {
            Ok(0) if wanted => {
                self.transition(ConnectionState::on_end_of_stream);
                debug!("[{}] end of stream from {}", self.inner.local_addr, self.inner.peer_addr);
                Err(Error::EndOfStream)
            }
            Ok(n) => {
                trace!("[{}] read {} bytes", self.inner.local_addr, n);
                Ok(n)
            }
            Err(e) => Err(self.classify(Op::Read, e)),
        }
    }

    /// Writes some prefix of `buf`, returning how many bytes the transport took.
    pub async fn write(&self, buf: &[u8]) -> Result<usize> {
        let stream = self.live_stream(Op::Write)?;

        let res = tokio::select! {
            biased;
            _ = self.inner.closing.cancelled() => {
                trace!("[{}] pending write interrupted by close", self.inner.local_addr);
                return Err(Error::ClosedHandle { op: Op::Write });
            }
            res = write_ready(&stream, buf) => res,
        };

        match res {
            Ok(n) => {
                trace!("[{}] wrote {} bytes", self.inner.local_addr, n);
                Ok(n)
            }
            Err(e) => Err(self.classify(Op::Write, e)),
        }
    }

    /// Writes all of `buf`, stopping at the first error.
    pub async fn write_all(&self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            match self.write(buf).await? {
                0 => {
                    return Err(Error::Io {
                        op: Op::Write,
                        source: std::io::ErrorKind::WriteZero.into(),
                    });
                }
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }

    /// Closes this end.
    ///
    /// A second close, through this or any cloned handle, returns
    /// [`Error::ClosedHandle`] without blocking.
    pub fn close(&self) -> Result<()> {
        let stream = {
            let mut slot = self.slot();
            let Some(stream) = slot.stream.take() else {
                return Err(Error::ClosedHandle { op: Op::Close });
            };
            slot.state = slot.state.on_local_close();
            stream
        };
        self.inner.closing.cancel();
        drop(stream);
        debug!("[{}] closed connection to {}", self.inner.local_addr, self.inner.peer_addr);
        Ok(())
    }

    fn live_stream(&self, op: Op) -> Result<Arc<TcpStream>> {
        self.slot()
            .stream
            .clone()
            .ok_or(Error::ClosedHandle { op })
    }

    fn classify(&self, op: Op, e: std::io::Error) -> Error {
        let err = Error::from_io(op, e);
        if err.kind() == ErrorKind::Reset {
            self.transition(ConnectionState::on_reset);
        }
        debug!("[{}] {}", self.inner.local_addr, err);
        err
    }

    fn transition(&self, f: impl FnOnce(ConnectionState) -> ConnectionState) {
        let mut slot = self.slot();
        slot.state = f(slot.state);
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn read_ready(stream: &TcpStream, buf: &mut [u8]) -> std::io::Result<usize> {
    loop {
        stream.readable().await?;
        match stream.try_read(buf) {
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
            res => return res,
        }
    }
}

async fn write_ready(stream: &TcpStream, buf: &[u8]) -> std::io::Result<usize> {
    loop {
        stream.writable().await?;
        match stream.try_write(buf) {
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
            res => return res,
        }
    }
}
