use std::fmt;
use std::io;
use std::net::SocketAddr;

/// The operation that ran into an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Read,
    Write,
    Close,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Read => write!(f, "read"),
            Op::Write => write!(f, "write"),
            Op::Close => write!(f, "close"),
        }
    }
}

/// Error classification, by meaning rather than by OS error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The peer closed gracefully; no further bytes will arrive.
    EndOfStream,
    /// The peer reset the stream ("broken pipe").
    Reset,
    /// The handle was closed, or is being closed, by this process.
    ClosedHandle,
    /// Binding the listener failed.
    Bind,
    /// Accepting an inbound connection failed.
    Accept,
    /// Dialing the listener failed.
    Dial,
    /// Any other transport error.
    Other,
}

impl ErrorKind {
    /// Setup errors abort a scenario instead of being observed by it.
    pub fn is_setup(self) -> bool {
        matches!(self, ErrorKind::Bind | ErrorKind::Accept | ErrorKind::Dial)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::EndOfStream => write!(f, "EndOfStream"),
            ErrorKind::Reset => write!(f, "Reset"),
            ErrorKind::ClosedHandle => write!(f, "ClosedHandle"),
            ErrorKind::Bind => write!(f, "Bind"),
            ErrorKind::Accept => write!(f, "Accept"),
            ErrorKind::Dial => write!(f, "Dial"),
            ErrorKind::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("end of stream")]
    EndOfStream,

    #[error("{op}: broken pipe: {source}")]
    Reset {
        op: Op,
        #[source]
        source: io::Error,
    },

    #[error("{op}: use of closed network connection")]
    ClosedHandle { op: Op },

    #[error("bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("accept: {0}")]
    Accept(#[source] io::Error),

    #[error("dial {addr}: {source}")]
    Dial {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("{op}: {source}")]
    Io {
        op: Op,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EndOfStream => ErrorKind::EndOfStream,
            Error::Reset { .. } => ErrorKind::Reset,
            Error::ClosedHandle { .. } => ErrorKind::ClosedHandle,
            Error::Bind { .. } => ErrorKind::Bind,
            Error::Accept(_) => ErrorKind::Accept,
            Error::Dial { .. } => ErrorKind::Dial,
            Error::Io { .. } => ErrorKind::Other,
        }
    }

    /// Classifies an I/O error raised by a read or write on an open socket.
    pub(crate) fn from_io(op: Op, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => Error::Reset { op, source },
            io::ErrorKind::UnexpectedEof => Error::EndOfStream,
            _ => Error::Io { op, source },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broken_pipe_is_reset() {
        let err = Error::from_io(Op::Write, io::Error::from(io::ErrorKind::BrokenPipe));
        assert_eq!(err.kind(), ErrorKind::Reset);
        assert!(err.to_string().contains("broken pipe"));
    }

    #[test]
    fn connection_reset_on_read_is_reset() {
        let err = Error::from_io(Op::Read, io::Error::from(io::ErrorKind::ConnectionReset));
        assert_eq!(err.kind(), ErrorKind::Reset);
    }

    #[test]
    fn unclassified_io_error_is_other() {
        let err = Error::from_io(Op::Read, io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn closed_handle_message() {
        let err = Error::ClosedHandle { op: Op::Read };
        assert_eq!(err.to_string(), "read: use of closed network connection");
    }

    #[test]
    fn setup_kinds() {
        assert!(ErrorKind::Bind.is_setup());
        assert!(ErrorKind::Accept.is_setup());
        assert!(ErrorKind::Dial.is_setup());
        assert!(!ErrorKind::EndOfStream.is_setup());
        assert!(!ErrorKind::ClosedHandle.is_setup());
    }
}
