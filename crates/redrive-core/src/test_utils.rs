use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_sqs::config::Credentials;
use testcontainers::ContainerAsync;
use testcontainers_modules::{
    localstack::LocalStack,
    testcontainers::{runners::AsyncRunner, Image, ImageExt, TestcontainersError},
};

use crate::sink::{DestinationKind, DestinationSink, OutboundMessage, SourceQueue};

/// Source queue fake that records every delete.
#[derive(Default)]
pub struct RecordingQueue {
    deleted: Mutex<Vec<String>>,
    failing_handles: HashSet<String>,
}

impl RecordingQueue {
    pub fn failing_on(handles: &[&str]) -> Self {
        Self {
            deleted: Mutex::default(),
            failing_handles: handles.iter().map(|h| h.to_string()).collect(),
        }
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceQueue for RecordingQueue {
    async fn delete(&self, ack_handle: &str) -> anyhow::Result<()> {
        if self.failing_handles.contains(ack_handle) {
            anyhow::bail!("receipt handle {ack_handle} has expired");
        }
        self.deleted.lock().unwrap().push(ack_handle.to_string());
        Ok(())
    }
}

/// Destination fake that records every successful forward.
pub struct RecordingSink {
    kind: DestinationKind,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingSink {
    pub fn queue() -> Self {
        Self {
            kind: DestinationKind::Queue,
            sent: Mutex::default(),
        }
    }

    pub fn topic() -> Self {
        Self {
            kind: DestinationKind::Topic,
            sent: Mutex::default(),
        }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DestinationSink for RecordingSink {
    fn kind(&self) -> DestinationKind {
        self.kind
    }

    async fn forward(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn local_config(endpoint_url: &str, region: Option<&'static str>) -> aws_config::ConfigLoader {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .endpoint_url(endpoint_url)
        .region(region.unwrap_or("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "static"))
}

pub async fn localstack() -> Result<(String, ContainerAsync<LocalStack>), TestcontainersError> {
    let request = LocalStack::default()
        .with_tag("latest")
        .with_env_var("SERVICES", "sqs,sns")
        .with_env_var("SKIP_SSL_CERT_DOWNLOAD", "1");
    let container = request.start().await?;

    let host_ip = container.get_host().await?;
    let host_port = container.get_host_port_ipv4(4566).await?;
    let endpoint_url = format!("http://{host_ip}:{host_port}");

    Ok((endpoint_url, container))
}

/// Generate a unique resource name for testing, using a UUID suffix.
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

async fn awslocal<I: Image>(
    container: &ContainerAsync<I>,
    args: &[&str],
    ready: &str,
) -> Result<serde_json::Value, TestcontainersError> {
    let command = testcontainers::core::ExecCommand::new(
        std::iter::once("awslocal").chain(args.iter().copied()),
    )
    .with_container_ready_conditions(vec![testcontainers::core::WaitFor::message_on_stdout(
        ready,
    )]);

    let mut result = container.exec(command).await?;
    let output = result.stdout_to_vec().await?;

    serde_json::from_slice(&output).map_err(|e| TestcontainersError::Other(Box::new(e)))
}

/// Creates a queue and returns its URL. FIFO queues get a `.fifo` suffix.
pub async fn create_test_queue<I: Image>(
    container: &ContainerAsync<I>,
    name: &str,
    fifo: bool,
) -> Result<String, TestcontainersError> {
    let name = if fifo {
        format!("{name}.fifo")
    } else {
        name.to_string()
    };

    let mut args = vec!["sqs", "create-queue", "--queue-name", name.as_str()];
    if fifo {
        args.extend(["--attributes", "FifoQueue=true"]);
    }

    let json = awslocal(container, &args, "AWS sqs.CreateQueue => 200").await?;

    match json["QueueUrl"].as_str() {
        Some(url) => Ok(url.to_string()),
        None => Err(TestcontainersError::Other(
            "QueueUrl not found in response".into(),
        )),
    }
}

/// Creates a standard topic and returns its ARN.
pub async fn create_test_topic<I: Image>(
    container: &ContainerAsync<I>,
    name: &str,
) -> Result<String, TestcontainersError> {
    let json = awslocal(
        container,
        &["sns", "create-topic", "--name", name],
        "AWS sns.CreateTopic => 200",
    )
    .await?;

    match json["TopicArn"].as_str() {
        Some(arn) => Ok(arn.to_string()),
        None => Err(TestcontainersError::Other(
            "TopicArn not found in response".into(),
        )),
    }
}
