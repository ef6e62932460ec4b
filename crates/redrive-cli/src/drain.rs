use aws_config::SdkConfig;
use redrive::{RelayConfig, SqsQueue};

/// Receives from the source queue and relays each batch until a receive comes
/// back empty or `max_rounds` batches were handled.
///
/// Records that fail stay on the queue and become visible again after the
/// visibility timeout, so a drain never loops on the same failing message.
pub async fn run(config: &RelayConfig, aws: &SdkConfig, max_rounds: usize) -> anyhow::Result<()> {
    let source = SqsQueue::from_config(aws, &config.source_queue_url);
    let relay = config.relay(aws);

    for round in 1..=max_rounds {
        let records = source.receive().await?;
        if records.is_empty() {
            log::info!("{} is empty", config.source_queue_url);
            return Ok(());
        }

        let result = relay.relay_batch(&records).await;
        println!("round {round}: {result}");
    }

    log::info!("stopped after {max_rounds} rounds");
    Ok(())
}
