//! Startup configuration: where to read from, where to write to, and how.

use std::sync::Arc;

use aws_config::SdkConfig;

use crate::error::ConfigError;
use crate::ordering::OrderingPolicy;
use crate::relay::{Relay, RelayOptions};
use crate::sink::{is_fifo, DestinationSink};
use crate::sns::SnsTopic;
use crate::sqs::SqsQueue;

/// LocalStack edge endpoint used by `--local` runs.
pub const LOCAL_ENDPOINT: &str = "http://localhost:4566";

/// Where relayed messages go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Queue { url: String },
    Topic { arn: String },
}

impl Destination {
    /// SNS topic ARNs select a topic, anything else is taken as a queue URL.
    pub fn parse(identifier: &str) -> Result<Self, ConfigError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ConfigError::MissingDestination);
        }

        if identifier.starts_with("arn:aws:sns:") {
            Ok(Self::Topic {
                arn: identifier.to_string(),
            })
        } else {
            Ok(Self::Queue {
                url: identifier.to_string(),
            })
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Destination::Queue { url } => url,
            Destination::Topic { arn } => arn,
        }
    }
}

/// Validates the URL of the queue records are relayed from.
pub fn source_queue_url(url: &str) -> Result<String, ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::MissingSource);
    }
    Ok(url.to_string())
}

/// Everything the relay needs, resolved once at process start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    pub source_queue_url: String,
    pub destination: Destination,
    pub options: RelayOptions,
}

impl RelayConfig {
    /// Builds a config, deriving FIFO awareness from the resource names.
    pub fn new(
        source_queue_url: impl Into<String>,
        destination: Destination,
        options: RelayOptions,
    ) -> Self {
        let source_queue_url = source_queue_url.into();
        let ordering = OrderingPolicy {
            source_ordered: is_fifo(&source_queue_url),
            destination_ordered: is_fifo(destination.identifier()),
        };

        Self {
            source_queue_url,
            destination,
            options: RelayOptions { ordering, ..options },
        }
    }

    /// Wires real SQS/SNS clients into a [`Relay`].
    pub fn relay(&self, config: &SdkConfig) -> Relay {
        let source = Arc::new(SqsQueue::from_config(config, &self.source_queue_url));
        let destination: Arc<dyn DestinationSink> = match &self.destination {
            Destination::Queue { url } => Arc::new(SqsQueue::from_config(config, url)),
            Destination::Topic { arn } => Arc::new(SnsTopic::from_config(config, arn)),
        };

        Relay::new(source, destination, self.options.clone())
    }
}

/// Loads the AWS SDK configuration.
///
/// The region comes from the standard provider chain and falls back to
/// `us-east-1`. With `local`, static test credentials are used and requests go
/// to `endpoint` or the LocalStack default.
pub async fn load_aws_config(local: bool, endpoint: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest()).region(
        aws_config::meta::region::RegionProviderChain::default_provider()
            .or_else(aws_config::Region::from_static("us-east-1")),
    );

    if local {
        loader = loader
            .credentials_provider(aws_sdk_sqs::config::Credentials::new(
                "test", "test", None, None, "static",
            ))
            .endpoint_url(endpoint.unwrap_or(LOCAL_ENDPOINT));
    } else if let Some(endpoint) = endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}
