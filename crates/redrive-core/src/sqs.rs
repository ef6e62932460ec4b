//! SQS client wrapper acting as both relay source and relay destination.

use anyhow::Context;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs as sqs;

use crate::record::InboundRecord;
use crate::sink::{DestinationKind, DestinationSink, OutboundMessage, SourceQueue};

/// Receives messages from an SQS queue.
///
/// Retrieves up to 10 messages at a time with a 30-second visibility timeout,
/// along with every system attribute so FIFO group and deduplication ids
/// survive the hop.
///
/// # Errors
///
/// Returns an error if the SQS API call fails.
pub async fn receive(
    client: &sqs::Client,
    queue_url: &str,
) -> anyhow::Result<sqs::operation::receive_message::ReceiveMessageOutput> {
    let result = client
        .receive_message()
        .queue_url(queue_url)
        .max_number_of_messages(10)
        .visibility_timeout(30)
        .message_system_attribute_names(sqs::types::MessageSystemAttributeName::All)
        .send()
        .await;

    result.context("failed to receive messages")
}

/// A single SQS queue.
///
/// # Example
///
/// ```no_run
/// use redrive::SqsQueue;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = aws_config::from_env().load().await;
/// let dlq = SqsQueue::from_config(&config, "https://sqs.us-east-1.amazonaws.com/123/my-dlq");
///
/// for record in dlq.receive().await? {
///     println!("{}: {}", record.id, record.body);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct SqsQueue {
    /// The SQS client instance
    pub client: sqs::Client,
    /// The URL of the queue this wrapper operates on
    pub queue_url: String,
}

impl SqsQueue {
    pub fn from_config(config: &SdkConfig, queue_url: impl Into<String>) -> Self {
        Self {
            client: sqs::Client::new(config),
            queue_url: queue_url.into(),
        }
    }

    /// Receives the next batch of records from the queue.
    ///
    /// Messages missing an id, body or receipt handle are logged and dropped;
    /// they stay on the queue and reappear after the visibility timeout.
    pub async fn receive(&self) -> anyhow::Result<Vec<InboundRecord>> {
        let output = receive(&self.client, &self.queue_url).await?;

        let records = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| {
                let id = m.message_id.clone();
                let record = InboundRecord::from_aws_message(m);
                if record.is_none() {
                    log::warn!("skipping incomplete message {:?} from {}", id, self.queue_url);
                }
                record
            })
            .collect();

        Ok(records)
    }

    /// Sends one message, attaching FIFO attributes only when present.
    pub async fn enqueue(
        &self,
        body: &str,
        ordering_group: Option<&str>,
        dedup_key: Option<&str>,
    ) -> anyhow::Result<()> {
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .set_message_group_id(ordering_group.map(str::to_string))
            .set_message_deduplication_id(dedup_key.map(str::to_string))
            .send()
            .await
            .with_context(|| format!("failed to send message to {}", self.queue_url))?;

        log::debug!(
            "sent message {} to {}",
            output.message_id().unwrap_or("<unknown>"),
            self.queue_url
        );
        Ok(())
    }

    /// Deletes a received message using its receipt handle.
    pub async fn delete_message(&self, receipt_handle: &str) -> anyhow::Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .with_context(|| format!("failed to delete message from {}", self.queue_url))?;

        Ok(())
    }
}

#[async_trait]
impl SourceQueue for SqsQueue {
    async fn delete(&self, ack_handle: &str) -> anyhow::Result<()> {
        self.delete_message(ack_handle).await
    }
}

#[async_trait]
impl DestinationSink for SqsQueue {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Queue
    }

    async fn forward(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        self.enqueue(
            &message.body,
            message.ordering_group.as_deref(),
            message.dedup_key.as_deref(),
        )
        .await
    }
}
