//! Capabilities the relay needs from the outside world.
//!
//! The driver never talks to AWS directly. It is handed a [`SourceQueue`] to
//! acknowledge records on and a [`DestinationSink`] to forward them to, which
//! keeps it testable against in-memory fakes.

use async_trait::async_trait;

/// A queue that delivered the records and can forget them once handled.
#[async_trait]
pub trait SourceQueue: Send + Sync {
    /// Deletes the delivery identified by `ack_handle`.
    async fn delete(&self, ack_handle: &str) -> anyhow::Result<()>;
}

/// Which kind of destination a sink writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestinationKind {
    Queue,
    Topic,
}

/// A message ready to be forwarded.
///
/// Optional attributes that are `None` must be left off the outgoing request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    pub body: String,
    /// Only meaningful for topics
    pub subject: Option<String>,
    pub ordering_group: Option<String>,
    pub dedup_key: Option<String>,
}

/// Where relayed records end up.
#[async_trait]
pub trait DestinationSink: Send + Sync {
    fn kind(&self) -> DestinationKind;

    /// Enqueues or publishes `message`, depending on the destination.
    async fn forward(&self, message: &OutboundMessage) -> anyhow::Result<()>;
}

/// Whether an SQS queue URL or an SNS topic ARN names a FIFO resource.
pub fn is_fifo(identifier: &str) -> bool {
    identifier
        .rsplit(['/', ':'])
        .next()
        .is_some_and(|name| name.ends_with(".fifo"))
}
