//! One-shot handoffs between the acceptor task and the scenario body.
//!
//! Both halves are consumed on use, so each value is produced at most once
//! and awaited at most once.

use std::fmt;

use log::debug;
use tokio::sync::oneshot;

use crate::error::{Error, ErrorKind, Result};

/// Byte count and error of one blocking call, detached from the live error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub bytes: usize,
    pub error: Option<ErrorKind>,
    pub message: Option<String>,
}

impl Outcome {
    pub fn ok(bytes: usize) -> Self {
        Outcome {
            bytes,
            error: None,
            message: None,
        }
    }

    pub fn failed(bytes: usize, err: &Error) -> Self {
        Outcome {
            bytes,
            error: Some(err.kind()),
            message: Some(err.to_string()),
        }
    }
}

impl From<&Result<usize>> for Outcome {
    fn from(res: &Result<usize>) -> Self {
        match res {
            Ok(n) => Outcome::ok(*n),
            Err(e) => Outcome::failed(0, e),
        }
    }
}

impl From<&Result<()>> for Outcome {
    fn from(res: &Result<()>) -> Self {
        match res {
            Ok(()) => Outcome::ok(0),
            Err(e) => Outcome::failed(0, e),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, &self.message) {
            (None, _) => write!(f, "({}, none)", self.bytes),
            (Some(kind), Some(msg)) => write!(f, "({}, {}: {})", self.bytes, kind, msg),
            (Some(kind), None) => write!(f, "({}, {})", self.bytes, kind),
        }
    }
}

/// The producing half went away without delivering.
#[derive(Debug, thiserror::Error)]
#[error("{0} dropped before delivering")]
pub struct Abandoned(&'static str);

/// Creates a single-use result handoff.
pub fn pending() -> (ResultSender, PendingResult) {
    let (tx, rx) = oneshot::channel();
    (ResultSender(tx), PendingResult(rx))
}

#[derive(Debug)]
pub struct ResultSender(oneshot::Sender<Outcome>);

impl ResultSender {
    pub fn send(self, outcome: Outcome) {
        if let Err(outcome) = self.0.send(outcome) {
            debug!("pending result {} has no reader", outcome);
        }
    }
}

/// Receiving half of [`pending`]. Waiting blocks until the sender delivers.
#[derive(Debug)]
pub struct PendingResult(oneshot::Receiver<Outcome>);

impl PendingResult {
    pub async fn wait(self) -> std::result::Result<Outcome, Abandoned> {
        self.0.await.map_err(|_| Abandoned("result sender"))
    }
}

/// Creates a single-use completion barrier.
pub fn completion() -> (Completer, CompletionSignal) {
    let (tx, rx) = oneshot::channel();
    (Completer(tx), CompletionSignal(rx))
}

#[derive(Debug)]
pub struct Completer(oneshot::Sender<()>);

impl Completer {
    pub fn complete(self) {
        if self.0.send(()).is_err() {
            debug!("completion signal has no waiter");
        }
    }
}

#[derive(Debug)]
pub struct CompletionSignal(oneshot::Receiver<()>);

impl CompletionSignal {
    pub async fn wait(self) -> std::result::Result<(), Abandoned> {
        self.0.await.map_err(|_| Abandoned("completer"))
    }
}
