use std::net::SocketAddr;

use log::*;
use xconn::{dial, Connection, Outcome};

use crate::error::Result;

/// The dialing side of a scenario. Every call is issued synchronously from
/// the scenario body and reported as an [`Outcome`].
pub struct Client {
    conn: Connection,
}

impl Client {
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        info!("Connecting to target: {}", target);
        let conn = dial(target).await?;
        info!("TCP socket connected from {}.", conn.local_addr());
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub async fn read(&self, buf_size: usize) -> Outcome {
        let mut buf = vec![0u8; buf_size];
        let outcome = Outcome::from(&self.conn.read(&mut buf).await);
        debug!("[client] read({}) -> {}", buf_size, outcome);
        outcome
    }

    pub async fn write(&self, payload: &[u8]) -> Outcome {
        let outcome = Outcome::from(&self.conn.write(payload).await);
        debug!("[client] write({}) -> {}", payload.len(), outcome);
        outcome
    }

    pub fn close(&self) -> Outcome {
        let outcome = Outcome::from(&self.conn.close());
        debug!("[client] close -> {}", outcome);
        outcome
    }
}
