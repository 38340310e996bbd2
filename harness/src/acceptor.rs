use std::time::Duration;

use log::*;
use tokio_util::task::AbortOnDropHandle;
use xconn::{completion, pending, CompletionSignal, Connection, Listener, Outcome, PendingResult};

use crate::error::{HarnessError, Result};

/// The server side of a scenario: accepts one connection on its own task and
/// performs a single blocking operation on it.
pub struct Acceptor {
    listener: Listener,
}

impl Acceptor {
    pub fn new(listener: Listener) -> Self {
        Self { listener }
    }

    /// Accepts, then blocks reading up to `buf_size` bytes.
    pub fn spawn_reader(self, buf_size: usize) -> ReadTask {
        let (tx, result) = pending();
        let task = tokio::spawn(async move {
            let conn = self.listener.accept().await?;
            tx.send(read_once(&conn, buf_size).await);
            Ok::<_, HarnessError>(())
        });
        ReadTask {
            result,
            task: AbortOnDropHandle::new(task),
        }
    }

    /// Accepts, closes, then completes the returned signal.
    pub fn spawn_closer(self) -> CloseTask {
        let (done, closed) = completion();
        let task = tokio::spawn(async move {
            let conn = self.listener.accept().await?;
            conn.close()?;
            info!("[acceptor] closed by server");
            done.complete();
            Ok::<_, HarnessError>(())
        });
        CloseTask {
            closed,
            task: AbortOnDropHandle::new(task),
        }
    }

    /// Accepts, starts a task that closes the connection after `delay`, then
    /// blocks reading up to `buf_size` bytes on the same connection.
    pub fn spawn_racing_reader(self, buf_size: usize, delay: Duration) -> ReadTask {
        let (tx, result) = pending();
        let task = tokio::spawn(async move {
            let conn = self.listener.accept().await?;

            let closer = conn.clone();
            let close_task = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                info!("[acceptor] closing connection on reading...");
                closer.close()
            });

            tx.send(read_once(&conn, buf_size).await);
            close_task.await??;
            Ok::<_, HarnessError>(())
        });
        ReadTask {
            result,
            task: AbortOnDropHandle::new(task),
        }
    }
}

async fn read_once(conn: &Connection, buf_size: usize) -> Outcome {
    let mut buf = vec![0u8; buf_size];
    let res = conn.read(&mut buf).await;
    let outcome = Outcome::from(&res);
    debug!("[acceptor] read({}) -> {}", buf_size, outcome);
    outcome
}

/// An acceptor routine that reports one read outcome.
pub struct ReadTask {
    result: PendingResult,
    task: AbortOnDropHandle<Result<()>>,
}

impl ReadTask {
    /// Waits for the reported outcome and for the routine to finish. A setup
    /// failure inside the routine takes precedence over the missing result.
    pub async fn outcome(self) -> Result<Outcome> {
        let delivered = self.result.wait().await;
        self.task.await??;
        Ok(delivered?)
    }
}

/// An acceptor routine that closes its connection and signals it.
pub struct CloseTask {
    closed: CompletionSignal,
    task: AbortOnDropHandle<Result<()>>,
}

impl CloseTask {
    /// Returns once the server-side close has happened.
    pub async fn closed(self) -> Result<()> {
        let signalled = self.closed.wait().await;
        self.task.await??;
        Ok(signalled?)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use xconn::{dial, ErrorKind};

    use super::*;

    async fn listener() -> Listener {
        Listener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reader_reports_data() {
        let listener = listener().await;
        let addr = listener.local_addr();
        let task = Acceptor::new(listener).spawn_reader(100);

        let client = dial(addr).await.unwrap();
        client.write_all(b"abc").await.unwrap();

        let outcome = task.outcome().await.unwrap();
        assert_eq!(outcome, Outcome::ok(3));
    }

    #[tokio::test]
    async fn test_closer_signals_after_close() {
        let listener = listener().await;
        let addr = listener.local_addr();
        let task = Acceptor::new(listener).spawn_closer();

        let client = dial(addr).await.unwrap();
        task.closed().await.unwrap();

        let mut buf = [0u8; 8];
        let err = client.read(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndOfStream);
    }
}
