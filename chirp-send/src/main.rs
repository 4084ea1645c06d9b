//! chirp-send - Background daemon for scheduled posting
//!
//! Polls the queue document and delivers posts whose schedule time has
//! arrived.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use libchirp::{Config, JsonFileStore, Result, Scheduler, SystemClock, TwitterClient};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "chirp-send")]
#[command(version)]
#[command(about = "Background daemon for scheduled posting")]
#[command(long_about = "\
chirp-send - Background daemon for scheduled posting

DESCRIPTION:
    chirp-send is a long-running daemon that polls the Chirp queue and
    delivers posts whose schedule time has arrived. Posts are delivered
    one at a time, in queue order. A post whose delivery fails stays in
    the queue and is retried on the next poll; it is never dropped
    because one attempt failed.

    The queue document is assumed to be owned by this single process
    while the daemon runs; there is no cross-process locking.

USAGE:
    # Run in foreground (logs to stderr)
    chirp-send

    # Custom poll interval
    chirp-send --poll-interval 30

SIGNALS:
    SIGTERM, SIGINT - Graceful shutdown (finishes the current pass)

CONFIGURATION:
    Configuration file: ~/.config/chirp/config.toml (override: CHIRP_CONFIG)
    Queue document: ~/.local/share/chirp/queue.json

EXIT CODES:
    0 - Clean shutdown
    1 - Runtime error
    2 - Authentication error
")]
struct Cli {
    /// Poll interval in seconds (overrides config)
    #[arg(long, value_name = "SECONDS")]
    poll_interval: Option<u64>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Run one scan-and-deliver pass and exit (for testing)
    #[arg(long, hide = true)]
    once: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    libchirp::logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let store = JsonFileStore::new(config.queue_path());
    let client = TwitterClient::new(config.credentials()?)?;
    let scheduler = Scheduler::new(store, client, SystemClock);

    info!("chirp-send daemon starting");

    if cli.once {
        let outcome = scheduler.tick().await?;
        info!(
            delivered = outcome.delivered,
            failed = outcome.failed,
            pending = outcome.pending,
            "processed queue once, exiting"
        );
        return Ok(());
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    setup_signal_handlers(shutdown.clone());

    let poll_interval = cli.poll_interval.unwrap_or(config.daemon.poll_interval);
    scheduler.run(poll_interval, shutdown).await?;

    info!("chirp-send daemon stopped");
    Ok(())
}

/// Set up signal handlers for graceful shutdown
fn setup_signal_handlers(shutdown: Arc<AtomicBool>) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::flag;

    for sig in [SIGINT, SIGTERM] {
        // Registration only fails for forbidden signals; these two are safe.
        if let Err(e) = flag::register(sig, shutdown.clone()) {
            eprintln!("Warning: failed to register signal handler: {}", e);
        }
    }
}
