use std::fmt;

/// Half-close state of one end of a stream, as observed by that end.
///
/// ```text
/// Open --(local close)--------------------> HalfClosedLocal
/// Open --(peer close seen by a read)------> HalfClosedRemote
/// Open --(peer reset seen by a write)-----> Closed
/// HalfClosedRemote --(local close)--------> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Both directions usable.
    Open,
    /// This end has been closed locally.
    HalfClosedLocal,
    /// The peer closed; reads return end-of-stream.
    HalfClosedRemote,
    /// Both directions are torn down.
    Closed,
}

impl ConnectionState {
    /// State after this end is closed locally.
    pub fn on_local_close(self) -> Self {
        match self {
            ConnectionState::Open => ConnectionState::HalfClosedLocal,
            _ => ConnectionState::Closed,
        }
    }

    /// State after a read observed the peer's graceful close.
    pub fn on_end_of_stream(self) -> Self {
        match self {
            ConnectionState::Open => ConnectionState::HalfClosedRemote,
            other => other,
        }
    }

    /// State after the peer's reset was observed.
    pub fn on_reset(self) -> Self {
        ConnectionState::Closed
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Open => write!(f, "OPEN"),
            ConnectionState::HalfClosedLocal => write!(f, "HALF-CLOSED-LOCAL"),
            ConnectionState::HalfClosedRemote => write!(f, "HALF-CLOSED-REMOTE"),
            ConnectionState::Closed => write!(f, "CLOSED"),
        }
    }
}
