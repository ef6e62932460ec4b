//! # redrive-core
//!
//! Core library for relaying messages out of AWS SQS queues.
//!
//! A [`Relay`] takes the records of one delivered batch, forwards each one to
//! a destination queue or SNS topic and deletes it from the source only once
//! the destination accepted it. Failures stay local to their record and are
//! left to the source queue's own redrive policy.
//!
//! ## Features
//!
//! - **Redrive**: move messages from a dead letter queue back to a main queue
//! - **Fan-out**: parse JSON messages and publish them to an SNS topic
//! - **FIFO hops**: carry message group and deduplication ids across, deriving
//!   a stable deduplication id from the message id when the source has none
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use redrive::{Relay, RelayOptions, SqsQueue};
//!
//! # async fn example(event: serde_json::Value) {
//! let config = aws_config::from_env().load().await;
//! let dlq = SqsQueue::from_config(&config, "https://sqs.us-east-1.amazonaws.com/123/my-dlq");
//! let main = SqsQueue::from_config(&config, "https://sqs.us-east-1.amazonaws.com/123/my-queue");
//!
//! let relay = Relay::new(Arc::new(dlq), Arc::new(main), RelayOptions::default());
//! let response = relay.handle_event(&event).await;
//! println!("{}", response.body);
//! # }
//! ```

mod config;
mod error;
mod ordering;
mod outcome;
mod payload;
mod record;
mod relay;
mod sink;
mod sns;
mod sqs;

#[cfg(test)]
mod test_utils;

pub use config::*;
pub use error::{ConfigError, RelayError};
pub use ordering::{
    dedup_digest, derive_context, OrderingContext, OrderingPolicy, FALLBACK_ORDERING_GROUP,
};
pub use outcome::{BatchResult, InvocationResponse, InvocationStatus, RecordReport, RelayOutcome};
pub use payload::{outbound_body, parse_body, Normalization, PayloadMode};
pub use record::{records_from_event, InboundRecord, RejectedRecord, SqsEventRecord};
pub use relay::{Relay, RelayOptions, DEFAULT_SUBJECT};
pub use sink::{is_fifo, DestinationKind, DestinationSink, OutboundMessage, SourceQueue};
pub use sns::SnsTopic;
pub use sqs::{receive, SqsQueue};
