use thiserror::Error;

use super::Datatype;

#[derive(Debug, Error)]
pub enum CommError {
    /// The substrate reported a failure; its diagnostic is attached.
    #[error("collective failed: {message}")]
    Substrate { message: String },

    #[error("collective buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("collective datatype mismatch: this rank sent {expected:?}")]
    TypeMismatch { expected: Datatype },
}
