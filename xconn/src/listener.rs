use std::net::SocketAddr;

use log::{debug, info};
use tokio::net::{TcpListener, TcpStream};

use crate::connection::Connection;
use crate::error::{Error, Result};

/// A bound TCP endpoint producing one [`Connection`] per accept call.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Binds `addr`. Port 0 asks the OS for an ephemeral port; the resolved
    /// address is available from [`Listener::local_addr`].
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        let local_addr = inner
            .local_addr()
            .map_err(|source| Error::Bind { addr, source })?;
        info!("Listening on TCP {}", local_addr);
        Ok(Listener { inner, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Waits for the next inbound connection.
    pub async fn accept(&self) -> Result<Connection> {
        let (stream, peer) = self.inner.accept().await.map_err(Error::Accept)?;
        let local = stream.local_addr().map_err(Error::Accept)?;
        info!("Accepted TCP connection from {}", peer);
        Ok(Connection::new(stream, local, peer))
    }
}

/// Connects to `addr`.
pub async fn dial(addr: SocketAddr) -> Result<Connection> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| Error::Dial { addr, source })?;
    let local = stream
        .local_addr()
        .map_err(|source| Error::Dial { addr, source })?;
    debug!("Dialed {} from {}", addr, local);
    Ok(Connection::new(stream, local, addr))
}
