use std::future::Future;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use aws_config::SdkConfig;
use redrive::{InvocationResponse, RelayConfig};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Relays every event document read from `file` (or stdin), printing one
/// invocation response per event.
pub async fn run(config: &RelayConfig, aws: &SdkConfig, file: Option<&Path>) -> anyhow::Result<()> {
    let relay = config.relay(aws);
    let handle = |event: serde_json::Value| {
        let relay = &relay;
        async move { relay.handle_event(&event).await }
    };
    let mut stdout = std::io::stdout();

    match file {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            relay_lines(BufReader::new(file), handle, &mut stdout).await
        }
        None => relay_lines(BufReader::new(tokio::io::stdin()), handle, &mut stdout).await,
    }
}

/// Feeds each non-blank line of `input` to `handle` and writes the response
/// to `out` as one JSON line.
///
/// A line that is not JSON gets a rejected response. A read failure stops
/// the run and is returned, so later events are never silently dropped.
async fn relay_lines<R, H, F, W>(input: R, mut handle: H, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    H: FnMut(serde_json::Value) -> F,
    F: Future<Output = InvocationResponse>,
    W: Write,
{
    let mut lines = input.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("failed to read event line {}", line_no + 1))?
    {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<serde_json::Value>(&line) {
            Ok(event) => handle(event).await,
            Err(e) => {
                log::error!("invocation payload on line {line_no} is not JSON: {e}");
                InvocationResponse::rejected(format!("invalid event: {e}"))
            }
        };

        writeln!(out, "{}", serde_json::to_string(&response)?)?;
    }

    log::debug!("read {line_no} event lines");
    Ok(())
}
