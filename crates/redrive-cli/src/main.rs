use clap::{Parser, Subcommand};
use redrive::{Destination, Normalization, PayloadMode, RelayConfig, RelayOptions};

mod drain;
mod relay;

#[tokio::main]
pub async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = Cli::parse().run().await {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

#[derive(Debug, Parser)]
#[command(name = "redrive")]
#[command(about = "relay messages from an aws sqs queue to another queue or an sns topic", long_about = None)]
pub struct Cli {
    /// Use test credentials against LocalStack
    #[arg(long)]
    local: bool,

    /// Override the AWS endpoint
    #[arg(long, env = "REDRIVE_ENDPOINT_URL")]
    endpoint: Option<String>,

    /// URL of the queue messages are relayed from
    #[arg(long, env = "REDRIVE_SOURCE_QUEUE_URL", value_parser = redrive::source_queue_url)]
    source: String,

    /// Queue URL or SNS topic ARN messages are relayed to
    #[arg(long, env = "REDRIVE_DESTINATION", value_parser = Destination::parse)]
    destination: Destination,

    /// pass-through | parse-and-wrap
    #[arg(long, env = "REDRIVE_PAYLOAD_MODE", default_value = "pass-through")]
    payload_mode: PayloadMode,

    /// off | unescape-quotes | unwrap-string
    #[arg(long, env = "REDRIVE_NORMALIZE", default_value = "off")]
    normalize: Normalization,

    /// Subject for topic publishes
    #[arg(long, env = "REDRIVE_SUBJECT", default_value = redrive::DEFAULT_SUBJECT)]
    subject: String,

    /// Treat the source as FIFO regardless of its name
    #[arg(long)]
    fifo_source: bool,

    /// Treat the destination as FIFO regardless of its name
    #[arg(long)]
    fifo_destination: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Relay SQS event documents, one JSON object per line
    Relay {
        /// Path to a JSONL file of events (reads from stdin if omitted)
        file: Option<std::path::PathBuf>,
    },
    /// Poll the source queue and relay until it is empty
    Drain {
        /// Maximum number of receive rounds
        #[arg(long, default_value_t = 10)]
        max_rounds: usize,
    },
}

impl Cli {
    fn config(&self) -> RelayConfig {
        let options = RelayOptions {
            payload_mode: self.payload_mode,
            normalization: self.normalize,
            subject: Some(self.subject.clone()).filter(|s| !s.is_empty()),
            ..Default::default()
        };

        let mut config = RelayConfig::new(&self.source, self.destination.clone(), options);
        config.options.ordering.source_ordered |= self.fifo_source;
        config.options.ordering.destination_ordered |= self.fifo_destination;
        config
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.config();
        log::info!(
            "relaying from {} to {} ({:?})",
            config.source_queue_url,
            config.destination.identifier(),
            config.options.payload_mode
        );

        let aws = redrive::load_aws_config(self.local, self.endpoint.as_deref()).await;

        match self.command {
            Commands::Relay { file } => relay::run(&config, &aws, file.as_deref()).await,
            Commands::Drain { max_rounds } => drain::run(&config, &aws, max_rounds).await,
        }
    }
}
