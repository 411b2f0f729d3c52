//! Runs one route search from the command line and prints its progress.
//!
//! Configuration comes from `ROUTE_STREAM_*` variables (optionally via a
//! `.env` file) and can be overridden with flags. Ctrl-C cancels the job.

use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use route_stream::observability::init_observability;
use route_stream::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "route-search", about = "Stream a route search between two tracks")]
struct Args {
    /// Track id the route starts from.
    start_id: String,
    /// Track id the route ends at.
    end_id: String,
    /// Number of items to sample the route down to.
    #[arg(short = 'n', long, default_value_t = route_stream::model::DEFAULT_DESIRED_COUNT)]
    count: u32,
    /// Search service base URL (overrides ROUTE_STREAM_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,
    /// Seconds the stream may stay silent (overrides ROUTE_STREAM_TIMEOUT_SECS).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_observability("info");
    let args = Args::parse();

    let mut config = ClientConfig::from_env().context("invalid ROUTE_STREAM_* configuration")?;
    if let Some(base_url) = args.base_url {
        config = config.base_url(base_url);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.read_timeout(Duration::from_secs(secs));
    }

    let client = RouteSearchClient::new(config)?;
    let request = StreamRequest::with_count(args.start_id, args.end_id, args.count)?;
    let handlers = Handlers::new()
        .on_progress(print_progress)
        .on_result(print_result);

    let handle = client.start(request, handlers);
    tracing::info!(subscription_id = %handle.id(), "route search started");
    let cancel = handle.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("cancelling...");
            cancel.cancel();
        }
    });

    let outcome = handle.wait().await?;
    if outcome == SubscriptionOutcome::Cancelled {
        eprintln!("cancelled");
    }
    exit_status(outcome)
}

/// Failures are left to the returned error, which anyhow prints on exit.
fn exit_status(outcome: SubscriptionOutcome) -> anyhow::Result<()> {
    match outcome {
        SubscriptionOutcome::Completed | SubscriptionOutcome::Cancelled => Ok(()),
        SubscriptionOutcome::Failed { message } => anyhow::bail!("search failed: {message}"),
    }
}

fn print_progress(event: ProgressEvent) {
    match event.phase {
        Phase::Search => println!(
            "[search] iteration={} visited={} queue={} {}",
            event.iteration.unwrap_or_default(),
            event.visited.unwrap_or_default(),
            event.queue_size.unwrap_or_default(),
            event.current_item.as_deref().unwrap_or(""),
        ),
        phase => println!("[{phase}] {}", event.message.as_deref().unwrap_or("")),
    }
}

fn print_result(result: ResultEvent) {
    if !result.success {
        println!(
            "no route found: {}",
            result.error.as_deref().unwrap_or("unknown reason")
        );
        return;
    }
    println!(
        "route of {} items (sampled from {}):",
        result.sampled_length, result.path_length
    );
    for item in &result.items {
        let role = match item.role {
            ItemRole::Start => "start".to_string(),
            ItemRole::End => "end".to_string(),
            ItemRole::Bridge {
                similarity: Some(s),
            } => format!("bridge {:.0}%", s * 100.0),
            ItemRole::Bridge { similarity: None } => "bridge".to_string(),
        };
        println!(
            "{:>3}. {} - {} [{role}]",
            item.position + 1,
            item.creator.as_deref().unwrap_or("?"),
            item.title.as_deref().unwrap_or(&item.id),
        );
    }
}
