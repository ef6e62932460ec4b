#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use redrive::{
    DestinationKind, DestinationSink, OutboundMessage, Relay, RelayOptions, SourceQueue,
};

/// Every call made against the fakes, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Forward(OutboundMessage),
    Delete(String),
}

#[derive(Default)]
pub struct Journal(Mutex<Vec<Call>>);

impl Journal {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn forwards(&self) -> Vec<OutboundMessage> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Forward(m) => Some(m),
                Call::Delete(_) => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(h) => Some(h),
                Call::Forward(_) => None,
            })
            .collect()
    }
}

pub struct FakeQueue {
    journal: Arc<Journal>,
    failing_handles: HashSet<String>,
}

#[async_trait]
impl SourceQueue for FakeQueue {
    async fn delete(&self, ack_handle: &str) -> anyhow::Result<()> {
        self.journal.push(Call::Delete(ack_handle.to_string()));
        if self.failing_handles.contains(ack_handle) {
            anyhow::bail!("ReceiptHandleIsInvalid: {ack_handle}");
        }
        Ok(())
    }
}

pub struct FakeSink {
    kind: DestinationKind,
    journal: Arc<Journal>,
    failing_bodies: HashSet<String>,
    require_dedup_key: bool,
}

#[async_trait]
impl DestinationSink for FakeSink {
    fn kind(&self) -> DestinationKind {
        self.kind
    }

    async fn forward(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        self.journal.push(Call::Forward(message.clone()));
        if self.failing_bodies.contains(&message.body) {
            anyhow::bail!("ServiceUnavailable");
        }
        if self.require_dedup_key && message.dedup_key.is_none() {
            anyhow::bail!("InvalidParameterValue: MessageDeduplicationId is required");
        }
        Ok(())
    }
}

/// Builds a relay over fakes that share one journal.
pub struct Harness {
    pub kind: DestinationKind,
    pub failing_deletes: Vec<String>,
    pub failing_forwards: Vec<String>,
    pub require_dedup_key: bool,
}

impl Harness {
    pub fn queue() -> Self {
        Self {
            kind: DestinationKind::Queue,
            failing_deletes: Vec::new(),
            failing_forwards: Vec::new(),
            require_dedup_key: false,
        }
    }

    pub fn topic() -> Self {
        Self {
            kind: DestinationKind::Topic,
            ..Self::queue()
        }
    }

    pub fn fail_delete(mut self, handle: &str) -> Self {
        self.failing_deletes.push(handle.to_string());
        self
    }

    pub fn fail_forward(mut self, body: &str) -> Self {
        self.failing_forwards.push(body.to_string());
        self
    }

    pub fn strict_fifo(mut self) -> Self {
        self.require_dedup_key = true;
        self
    }

    pub fn build(self, options: RelayOptions) -> (Relay, Arc<Journal>) {
        let journal = Arc::new(Journal::default());
        let source = FakeQueue {
            journal: journal.clone(),
            failing_handles: self.failing_deletes.into_iter().collect(),
        };
        let sink = FakeSink {
            kind: self.kind,
            journal: journal.clone(),
            failing_bodies: self.failing_forwards.into_iter().collect(),
            require_dedup_key: self.require_dedup_key,
        };

        (Relay::new(Arc::new(source), Arc::new(sink), options), journal)
    }
}
