//! The batch relay driver.

use std::sync::Arc;

use crate::error::RelayError;
use crate::ordering::{derive_context, OrderingPolicy};
use crate::outcome::{BatchResult, InvocationResponse, RecordReport, RelayOutcome};
use crate::payload::{outbound_body, Normalization, PayloadMode};
use crate::record::{records_from_event, InboundRecord};
use crate::sink::{DestinationKind, DestinationSink, OutboundMessage, SourceQueue};

/// Subject attached to topic publishes unless configured otherwise.
pub const DEFAULT_SUBJECT: &str = "Message Processing Success";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayOptions {
    pub payload_mode: PayloadMode,
    pub normalization: Normalization,
    /// Publish subject; ignored by queue destinations
    pub subject: Option<String>,
    pub ordering: OrderingPolicy,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            payload_mode: PayloadMode::default(),
            normalization: Normalization::default(),
            subject: Some(DEFAULT_SUBJECT.to_string()),
            ordering: OrderingPolicy::default(),
        }
    }
}

/// Moves records from a source queue to a destination, one at a time.
///
/// A record is deleted from the source only after the destination accepted
/// it. Nothing is retried here: a record that is not deleted becomes visible
/// again on the source and its own redrive policy decides what happens next.
/// The relay holds no state between invocations, so several can run
/// concurrently against the same queue.
#[derive(Clone)]
pub struct Relay {
    source: Arc<dyn SourceQueue>,
    destination: Arc<dyn DestinationSink>,
    options: RelayOptions,
}

impl Relay {
    pub fn new(
        source: Arc<dyn SourceQueue>,
        destination: Arc<dyn DestinationSink>,
        options: RelayOptions,
    ) -> Self {
        Self {
            source,
            destination,
            options,
        }
    }

    /// Handles one invocation payload.
    ///
    /// A payload without a `Records` array is rejected with a 400 response
    /// before anything is forwarded or deleted. An entry that is not shaped
    /// like a message fails on its own and stays on the source.
    pub async fn handle_event(&self, event: &serde_json::Value) -> InvocationResponse {
        log::debug!("relay invoked with event: {event}");

        let entries = match records_from_event(event) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("{e}; check the trigger source");
                return InvocationResponse::rejected(e);
            }
        };

        let mut reports = Vec::with_capacity(entries.len());
        for entry in entries {
            let report = match entry {
                Ok(record) => RecordReport {
                    outcome: self.relay_record(&record).await,
                    id: record.id,
                },
                Err(rejected) => {
                    log::error!(
                        "message {:?} is not an SQS record: {}; leaving it on the source",
                        rejected.id,
                        rejected.reason
                    );
                    RecordReport {
                        id: rejected.id,
                        outcome: RelayOutcome::Failed(RelayError::MalformedRecord(rejected.reason)),
                    }
                }
            };
            reports.push(report);
        }

        let result = BatchResult { reports };
        log::info!("{result}");
        InvocationResponse::completed(&result)
    }

    /// Relays every record in `records`, in order.
    ///
    /// A failing record never stops the batch; the result holds exactly one
    /// report per input record.
    pub async fn relay_batch(&self, records: &[InboundRecord]) -> BatchResult {
        let mut reports = Vec::with_capacity(records.len());

        for record in records {
            let outcome = self.relay_record(record).await;
            reports.push(RecordReport {
                id: record.id.clone(),
                outcome,
            });
        }

        BatchResult { reports }
    }

    /// Forwards one record and, if that succeeded, deletes it from the source.
    pub async fn relay_record(&self, record: &InboundRecord) -> RelayOutcome {
        log::info!("processing message {}", record.id);

        let blank = match self.options.payload_mode {
            PayloadMode::PassThrough => record.body.is_empty(),
            PayloadMode::ParseAndWrap => record.body.trim().is_empty(),
        };
        if blank {
            log::warn!("message {} has an empty body, leaving it on the source", record.id);
            return RelayOutcome::Skipped("empty body".to_string());
        }

        let message = match self.outbound_message(record) {
            Ok(message) => message,
            Err(e) => {
                log::error!(
                    "unable to prepare message {}: {e}; raw body: {}",
                    record.id,
                    record.body
                );
                return RelayOutcome::Failed(e);
            }
        };

        if let Err(cause) = self.destination.forward(&message).await {
            let e = RelayError::Forward { cause };
            log::error!("message {}: {e}; raw body: {}", record.id, record.body);
            return RelayOutcome::Failed(e);
        }

        if let Err(cause) = self.source.delete(&record.ack_handle).await {
            let e = RelayError::Delete { cause };
            log::warn!("message {}: {e}; it may be delivered again", record.id);
            return RelayOutcome::Failed(e);
        }

        log::info!("relayed and deleted message {}", record.id);
        RelayOutcome::Forwarded
    }

    fn outbound_message(&self, record: &InboundRecord) -> Result<OutboundMessage, RelayError> {
        let body = outbound_body(
            &record.body,
            self.options.payload_mode,
            self.options.normalization,
        )?;

        let subject = match self.destination.kind() {
            DestinationKind::Topic => self.options.subject.clone(),
            DestinationKind::Queue => None,
        };

        let mut message = OutboundMessage {
            body,
            subject,
            ordering_group: None,
            dedup_key: None,
        };

        if self.options.ordering.destination_ordered {
            let context = derive_context(record, self.options.ordering)?;
            message.ordering_group = Some(context.ordering_group);
            message.dedup_key = context.dedup_key;
        }

        Ok(message)
    }
}
