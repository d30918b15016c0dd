use thiserror::Error;

pub type Result<T> = std::result::Result<T, NodeError>;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("could not join the ring via {0}: no reply")]
    JoinFailed(String),
    #[error("could not resolve {name}: {reason}")]
    ResolveFailed { name: String, reason: String },
    #[error("record store failure: {0}")]
    Storage(#[from] std::io::Error),
}
