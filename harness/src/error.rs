use xconn::Abandoned;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// A connection call the scenario depends on failed; bind, accept and
    /// dial failures land here.
    #[error("scenario aborted: {0}")]
    Aborted(#[from] xconn::Error),

    #[error(transparent)]
    Abandoned(#[from] Abandoned),

    #[error("acceptor task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("unknown scenario {0:?}")]
    UnknownScenario(String),
}

impl HarnessError {
    pub fn is_setup(&self) -> bool {
        matches!(self, HarnessError::Aborted(e) if e.kind().is_setup())
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
