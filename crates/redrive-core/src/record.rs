//! Inbound records and the SQS event payload that delivers them.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::RelayError;

/// System attribute carrying the FIFO message group.
pub const MESSAGE_GROUP_ID: &str = "MessageGroupId";
/// System attribute carrying the FIFO deduplication id.
pub const MESSAGE_DEDUPLICATION_ID: &str = "MessageDeduplicationId";

/// A single message delivered to the relay.
///
/// Immutable once received; the driver only reads from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundRecord {
    /// Message id assigned by the source queue
    pub id: String,
    /// Raw message body
    pub body: String,
    /// Receipt handle needed to delete the message from the source
    pub ack_handle: String,
    /// Transport-attached ordering group, if the source is FIFO
    pub ordering_group: Option<String>,
    /// Transport-attached deduplication id, if the source supplied one
    pub dedup_key: Option<String>,
}

impl InboundRecord {
    pub fn new(
        id: impl Into<String>,
        body: impl Into<String>,
        ack_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            ack_handle: ack_handle.into(),
            ordering_group: None,
            dedup_key: None,
        }
    }

    pub fn with_ordering_group(mut self, group: impl Into<String>) -> Self {
        self.ordering_group = Some(group.into());
        self
    }

    pub fn with_dedup_key(mut self, key: impl Into<String>) -> Self {
        self.dedup_key = Some(key.into());
        self
    }

    /// Converts a message returned by `ReceiveMessage`.
    ///
    /// Returns `None` when SQS left out the id, receipt handle or body, which
    /// only happens for malformed responses.
    pub fn from_aws_message(message: aws_sdk_sqs::types::Message) -> Option<Self> {
        let attributes = message.attributes.unwrap_or_default();
        let attribute = |name: &str| {
            attributes
                .get(&aws_sdk_sqs::types::MessageSystemAttributeName::from(name))
                .filter(|v| !v.is_empty())
                .cloned()
        };

        Some(Self {
            ordering_group: attribute(MESSAGE_GROUP_ID),
            dedup_key: attribute(MESSAGE_DEDUPLICATION_ID),
            id: message.message_id?,
            body: message.body?,
            ack_handle: message.receipt_handle?,
        })
    }
}

/// One entry of the `Records` array of an SQS trigger event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqsEventRecord {
    pub message_id: String,
    pub receipt_handle: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl From<SqsEventRecord> for InboundRecord {
    fn from(record: SqsEventRecord) -> Self {
        let mut attributes = record.attributes;
        let mut take = |name: &str| attributes.remove(name).filter(|v| !v.is_empty());

        Self {
            ordering_group: take(MESSAGE_GROUP_ID),
            dedup_key: take(MESSAGE_DEDUPLICATION_ID),
            id: record.message_id,
            body: record.body,
            ack_handle: record.receipt_handle,
        }
    }
}

/// An entry of `Records` that could not be read as an SQS message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedRecord {
    /// The entry's `messageId` when it has a string one, otherwise empty
    pub id: String,
    pub reason: String,
}

impl RejectedRecord {
    fn new(entry: &serde_json::Value, reason: impl ToString) -> Self {
        Self {
            id: entry
                .get("messageId")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Extracts the records from an invocation payload.
///
/// Only the `Records` container is checked up front: a payload without it,
/// or with a `Records` that is not an array, is [`RelayError::MalformedBatch`].
/// Each entry is converted on its own, so a badly shaped entry comes back as a
/// [`RejectedRecord`] in its position and the others are unaffected. An empty
/// array is a valid, empty batch.
pub fn records_from_event(
    event: &serde_json::Value,
) -> Result<Vec<Result<InboundRecord, RejectedRecord>>, RelayError> {
    let entries = match event.get("Records") {
        Some(serde_json::Value::Array(entries)) => entries,
        None | Some(serde_json::Value::Null) => {
            return Err(RelayError::MalformedBatch(
                "event does not contain SQS records".into(),
            ))
        }
        Some(other) => {
            return Err(RelayError::MalformedBatch(format!(
                "Records must be an array, got {other}"
            )))
        }
    };

    Ok(entries
        .iter()
        .map(|entry| {
            SqsEventRecord::deserialize(entry)
                .map(InboundRecord::from)
                .map_err(|e| RejectedRecord::new(entry, e))
        })
        .collect())
}
