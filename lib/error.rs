use thiserror::Error;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    /// The statement could not be classified, or its fragments are in the wrong shape.
    #[error("malformed statement: {0}")]
    MalformedStatement(String),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("no lookup method for type {0}")]
    UnknownLookupType(String),

    /// The host finder failed; its error is surfaced as is.
    #[error(transparent)]
    LookupFailed(anyhow::Error),

    #[error("no converter for type {0}")]
    UnknownConverterType(String),

    #[error("error converting {text} to {tag}: {source}")]
    ConversionFailed {
        text: String,
        tag: String,
        source: anyhow::Error,
    },

    /// Missing field or method, a bad index, or a failure reported by the host call.
    #[error("dispatch failed: {0}")]
    DispatchFailed(String),
}

impl EvalError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedStatement(message.into())
    }

    pub fn dispatch(message: impl Into<String>) -> Self {
        Self::DispatchFailed(message.into())
    }
}
