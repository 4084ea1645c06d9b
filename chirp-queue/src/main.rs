//! chirp-queue - Manage the scheduled-post queue

use clap::{Parser, Subcommand};
use libchirp::{ChirpError, Config, JsonFileStore, Result, ScheduledPost, SystemClock};

#[derive(Parser, Debug)]
#[command(name = "chirp-queue")]
#[command(version)]
#[command(about = "Manage scheduled posts")]
#[command(long_about = "\
chirp-queue - Manage scheduled posts

DESCRIPTION:
    Queues posts for later delivery by chirp-send, lists what is pending,
    and cancels queued posts. The queue is a JSON document owned by one
    process at a time; do not run multiple daemons against it.

COMMANDS:
    add     Queue a post for later delivery
    list    List pending posts
    cancel  Cancel a pending post by id

TIME FORMATS:
    18:00               today at 18:00
    12-31 23:59         that date this year
    2024-01-01 00:00    exact date and time
    30m, 2h             relative to now

USAGE EXAMPLES:
    chirp-queue add \"Launch day!\" --at \"09-15 10:00\"
    chirp-queue add \"Reminder\" --at 2h --image banner.png
    chirp-queue list --format json
    chirp-queue cancel <POST_ID>

CONFIGURATION:
    Configuration file: ~/.config/chirp/config.toml (override: CHIRP_CONFIG)
    Queue document: ~/.local/share/chirp/queue.json

EXIT CODES:
    0 - Success
    1 - Queue or configuration error
    3 - Invalid input (bad time format, unknown post id, empty text)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Queue a post for later delivery
    Add {
        /// Text to post
        text: String,

        /// When to post it (e.g. "18:00", "12-31 23:59", "2h")
        #[arg(long, value_name = "TIME")]
        at: String,

        /// Path to an image file to attach at delivery time
        #[arg(short, long)]
        image: Option<String>,
    },

    /// List pending posts
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Cancel a pending post
    Cancel {
        /// Post id to cancel
        post_id: String,
    },
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

    match cli.command {
        Commands::Add { text, at, image } => {
            let post =
                libchirp::service::create_scheduled(&store, &SystemClock, &text, image, &at)
                    .await?;
            println!("Queued {} for {}", post.id, post.schedule_time);
        }
        Commands::List { format } => {
            cmd_list(&store, &format).await?;
        }
        Commands::Cancel { post_id } => {
            libchirp::service::cancel(&store, &post_id).await?;
            println!("Cancelled {}", post_id);
        }
    }

    Ok(())
}

async fn cmd_list(store: &JsonFileStore, format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        return Err(ChirpError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            format
        )));
    }

    let posts = libchirp::service::list_pending(store).await?;

    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&posts)
                .expect("scheduled posts always serialize")
        );
    } else {
        output_list_text(&posts);
    }

    Ok(())
}

fn output_list_text(posts: &[ScheduledPost]) {
    for post in posts {
        let preview = truncate_content(&post.text, 50);
        let attachment = post.image.as_deref().unwrap_or("-");
        println!(
            "{} | {} | {} | {}",
            post.id, post.schedule_time, preview, attachment
        );
    }
}

/// Truncate content to max length with ellipsis
fn truncate_content(content: &str, max_len: usize) -> String {
    if content.chars().count() <= max_len {
        content.to_string()
    } else {
        let truncated: String = content.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}
