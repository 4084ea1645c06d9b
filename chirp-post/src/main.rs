//! chirp-post - Post to X (Twitter) immediately

use std::io::Read;
use std::path::Path;

use clap::Parser;
use libchirp::{ChirpError, Config, Result, TwitterClient};

#[derive(Parser, Debug)]
#[command(name = "chirp-post")]
#[command(version)]
#[command(about = "Post to X (Twitter) from your terminal")]
#[command(long_about = "\
chirp-post - Post to X (Twitter) from your terminal

DESCRIPTION:
    Posts the given text immediately, optionally attaching one image.
    The image is uploaded to the media endpoint first and the returned
    media id is attached to the tweet.

USAGE EXAMPLES:
    # Post text
    chirp-post \"Hello world\"

    # Post with an image
    chirp-post \"Look at this\" --image photo.jpg

    # Read the text from stdin
    echo \"Hello world\" | chirp-post

CONFIGURATION:
    Configuration file: ~/.config/chirp/config.toml (override: CHIRP_CONFIG)
    Credentials: TWITTER_API_KEY, TWITTER_API_SECRET,
                 TWITTER_ACCESS_TOKEN, TWITTER_ACCESS_SECRET
    (environment variables take precedence over the config file)

EXIT CODES:
    0 - Posted successfully
    1 - Posting or network error
    2 - Authentication error
    3 - Invalid input
")]
struct Cli {
    /// Text to post (reads from stdin if not provided)
    text: Option<String>,

    /// Path to an image file to attach
    #[arg(short, long)]
    image: Option<String>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
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
    let text = match cli.text {
        Some(text) => text,
        None => read_stdin()?,
    };

    let config = Config::load()?;
    let client = TwitterClient::new(config.credentials()?)?;
    let image = cli.image.as_deref().map(Path::new);

    libchirp::service::post_now(&client, &text, image).await?;

    if image.is_some() {
        println!("Posted with media.");
    } else {
        println!("Posted.");
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|e| ChirpError::InvalidInput(format!("Failed to read stdin: {}", e)))?;
    Ok(text)
}
