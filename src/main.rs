//! Resilient probe.
//!
//! Sends a series of GET requests to one endpoint through a single
//! `ResilientExecutor`, so retry and circuit breaker behaviour can be
//! watched against a real dependency.
//!
//! # Usage
//! ```text
//! resilient-probe http://localhost:3000/health -n 20 --retry-count 1 --threshold 3
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use resilient_executor::config::{load_config, ResilienceConfig};
use resilient_executor::http;
use resilient_executor::observability::logging::init_logging;
use resilient_executor::ResilientExecutor;

#[derive(Parser)]
#[command(name = "resilient-probe")]
#[command(about = "Probe an HTTP endpoint through retry and a circuit breaker", long_about = None)]
struct Cli {
    /// Target URL
    url: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of requests to send
    #[arg(short = 'n', long, default_value_t = 10)]
    requests: u32,

    /// Pause between requests in milliseconds
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Override retry.max_attempts
    #[arg(long)]
    retry_count: Option<u32>,

    /// Override circuit_breaker.consecutive_threshold
    #[arg(long)]
    threshold: Option<u32>,

    /// Override circuit_breaker.half_open_after_ms
    #[arg(long)]
    half_open_after_ms: Option<u64>,
}

impl Cli {
    fn resolve_config(&self) -> Result<ResilienceConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ResilienceConfig::default(),
        };

        if let Some(retry_count) = self.retry_count {
            config.retry.max_attempts = retry_count;
        }
        if let Some(threshold) = self.threshold {
            config.circuit_breaker.consecutive_threshold = threshold;
        }
        if let Some(half_open_after_ms) = self.half_open_after_ms {
            config.circuit_breaker.half_open_after_ms = half_open_after_ms;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    init_logging(&config.observability);

    let executor = ResilientExecutor::from_config(&config)?;
    let client = reqwest::Client::new();

    tracing::info!(
        url = %cli.url,
        requests = cli.requests,
        retry_count = config.retry.max_attempts,
        threshold = config.circuit_breaker.consecutive_threshold,
        half_open_after_ms = config.circuit_breaker.half_open_after_ms,
        "Probe starting"
    );

    let (mut succeeded, mut failed, mut rejected) = (0u32, 0u32, 0u32);

    for request in 1..=cli.requests {
        match executor.execute(|| http::send(client.get(cli.url.as_str()))).await {
            Ok(response) => {
                succeeded += 1;
                tracing::info!(request, status = %response.status(), "Request succeeded");
            }
            Err(err) if err.is_circuit_open() => {
                rejected += 1;
                tracing::warn!(request, error = %err, "Request blocked by circuit breaker");
            }
            Err(err) => {
                failed += 1;
                tracing::warn!(request, error = %err, "Request failed");
            }
        }

        if request < cli.requests {
            tokio::time::sleep(Duration::from_millis(cli.interval_ms)).await;
        }
    }

    let summary = serde_json::json!({
        "succeeded": succeeded,
        "failed": failed,
        "rejected": rejected,
        "breaker": executor.breaker().snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
