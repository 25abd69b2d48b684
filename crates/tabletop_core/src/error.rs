//! Error types for the table component model.
use thiserror::Error;

/// Top-level error type for component, container and table operations.
#[derive(Error, Debug)]
pub enum TableError {
    /// The caller passed an argument that violates a precondition.
    #[error("Invalid argument: {0}")]
    ArgumentInvalid(String),

    /// The operation is not allowed in the current state.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// A memento could not be applied or reconstructed.
    #[error("Malformed memento")]
    MementoFormat(#[from] MementoError),
}

impl TableError {
    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Self::ArgumentInvalid(message.into())
    }

    pub(crate) fn state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }
}

/// Underlying cause of a [`TableError::MementoFormat`] failure.
#[derive(Error, Debug)]
pub enum MementoError {
    #[error("missing attribute '{0}'")]
    MissingAttribute(String),

    #[error("attribute '{name}' is not of type {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
    },

    #[error("unknown memento kind '{0}'")]
    UnknownKind(String),

    #[error("unknown component strategy '{0}'")]
    UnknownStrategy(String),

    #[error("strategy '{found}' does not match component strategy '{expected}'")]
    StrategyMismatch { expected: String, found: String },

    #[error("orientation '{0}' is not supported by the component strategy")]
    UnknownOrientation(String),

    #[error("unknown container layout '{0}'")]
    UnknownLayout(String),

    #[error("attribute '{name}' is out of range: {value}")]
    OutOfRange { name: String, value: i64 },

    #[error("child component could not be restored: {0}")]
    Component(#[source] Box<TableError>),
}

impl MementoError {
    pub(crate) fn missing(name: &str) -> Self {
        Self::MissingAttribute(name.to_string())
    }

    pub(crate) fn wrong_type(name: &str, expected: &'static str) -> Self {
        Self::WrongType {
            name: name.to_string(),
            expected,
        }
    }
}
