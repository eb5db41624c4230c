use crate::BlockId;
use thiserror::Error;

/// Errors returned by graph store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The operation referenced a block id that is not in the store
    #[error("Block not found: {0}")]
    NotFound(BlockId),

    /// An imported document failed to parse or has an invalid shape
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;
