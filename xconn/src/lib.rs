//! # XConn - TCP connection handles with an explicit termination model
//!
//! XConn wraps the platform's TCP primitives in a handle that makes the
//! three ways a stream can end observable as distinct error kinds:
//!
//! - **End of stream**: the peer closed gracefully and a read saw it
//! - **Reset**: the peer is gone and a write surfaced the reset ("broken pipe")
//! - **Closed handle**: this process closed the handle, possibly while another
//!   task was blocked on it
//!
//! It also carries the one-shot handoffs used to sequence two tasks around a
//! single connection.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Scenario / Acceptor tasks              │
//! ├─────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐ ┌──────────────┐ ┌─────────────────┐   │
//! │  │ Connection  │ │ PendingResult│ │CompletionSignal │   │
//! │  │ + state     │ │  (oneshot)   │ │   (oneshot)     │   │
//! │  └─────────────┘ └──────────────┘ └─────────────────┘   │
//! ├─────────────────────────────────────────────────────────┤
//! │                 tokio::net (TcpListener/TcpStream)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use xconn::{dial, Listener};
//!
//! let listener = Listener::bind("127.0.0.1:0".parse()?).await?;
//! let client = dial(listener.local_addr()).await?;
//! let server = listener.accept().await?;
//!
//! client.close()?;
//! let mut buf = [0u8; 100];
//! assert_eq!(server.read(&mut buf).await.unwrap_err().kind(), ErrorKind::EndOfStream);
//! ```

#![deny(unsafe_code)]

pub mod connection;
pub mod error;
pub mod handoff;
pub mod listener;
pub mod state;

pub use connection::Connection;
pub use error::{Error, ErrorKind, Op, Result};
pub use handoff::{completion, pending, Abandoned, CompletionSignal, Completer, Outcome, PendingResult, ResultSender};
pub use listener::{dial, Listener};
pub use state::ConnectionState;
