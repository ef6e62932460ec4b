//! Error taxonomy for a relay invocation.

/// Failures the relay driver can classify.
///
/// Only [`RelayError::MalformedBatch`] is fatal for an invocation. Every other
/// variant is record-local: the batch keeps going and the failed record is
/// reported in its [`crate::RelayOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The invocation payload carried no records container.
    #[error("malformed batch: {0}")]
    MalformedBatch(String),

    /// An entry of the records container is not shaped like a message.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// The record body was not a valid JSON document.
    #[error("unable to parse message body: {0}")]
    Parse(#[from] serde_json::Error),

    /// The record has no identifier to derive an ordering context from.
    #[error("record is missing its message id")]
    MissingIdentifier,

    /// The destination rejected or never received the message.
    #[error("failed to forward message: {cause:#}")]
    Forward { cause: anyhow::Error },

    /// The message was forwarded but could not be acknowledged at the source.
    #[error("message forwarded but not deleted from source: {cause:#}")]
    Delete { cause: anyhow::Error },
}

/// Invalid configuration detected at startup.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("source queue URL was not specified")]
    MissingSource,
    #[error("destination was not specified")]
    MissingDestination,
    #[error("unknown payload mode '{0}' (expected 'pass-through' or 'parse-and-wrap')")]
    UnknownPayloadMode(String),
    #[error("unknown normalization '{0}' (expected 'off', 'unescape-quotes' or 'unwrap-string')")]
    UnknownNormalization(String),
}
