//! SNS topic as a fan-out relay destination.

use anyhow::Context;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns as sns;

use crate::sink::{DestinationKind, DestinationSink, OutboundMessage};

#[derive(Clone, Debug)]
pub struct SnsTopic {
    pub client: sns::Client,
    pub topic_arn: String,
}

impl SnsTopic {
    pub fn from_config(config: &SdkConfig, topic_arn: impl Into<String>) -> Self {
        Self {
            client: sns::Client::new(config),
            topic_arn: topic_arn.into(),
        }
    }

    /// Publishes one notification. FIFO topics need `ordering_group`, and a
    /// `dedup_key` unless content-based deduplication is enabled.
    pub async fn publish(
        &self,
        body: &str,
        subject: Option<&str>,
        ordering_group: Option<&str>,
        dedup_key: Option<&str>,
    ) -> anyhow::Result<()> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(body)
            .set_subject(subject.map(str::to_string))
            .set_message_group_id(ordering_group.map(str::to_string))
            .set_message_deduplication_id(dedup_key.map(str::to_string))
            .send()
            .await
            .with_context(|| format!("failed to publish to {}", self.topic_arn))?;

        log::debug!(
            "published message {} to {}",
            output.message_id().unwrap_or("<unknown>"),
            self.topic_arn
        );
        Ok(())
    }
}

#[async_trait]
impl DestinationSink for SnsTopic {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Topic
    }

    async fn forward(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        self.publish(
            &message.body,
            message.subject.as_deref(),
            message.ordering_group.as_deref(),
            message.dedup_key.as_deref(),
        )
        .await
    }
}
