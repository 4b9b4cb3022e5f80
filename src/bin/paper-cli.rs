use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "paper-cli")]
#[command(about = "Management CLI for the paper generation service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:9002")]
    url: String,

    /// Admin API key
    #[arg(short, long, env = "PAPER_ADMIN_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health and credential counts
    Health,
    /// List credentials (masked) and their expiry state
    Credentials,
    /// Reset credentials whose cooldown has elapsed
    Sweep,
    /// Generate a dedication
    Dedication { topic: String },
    /// Generate a reference list
    References { topic: String },
    /// Generate a complete paper
    Paper {
        topic: String,
        #[arg(short, long, default_value_t = 5)]
        chapters: u32,
        #[arg(long, default_value = "")]
        parties: String,
        #[arg(long, default_value = "")]
        highlights: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if !cli.key.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
        );
    }

    let request = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)),
        Commands::Credentials => client
            .get(format!("{}/admin/credentials", base))
            .headers(headers),
        Commands::Sweep => client
            .post(format!("{}/admin/credentials/sweep", base))
            .headers(headers),
        Commands::Dedication { topic } => client
            .post(format!("{}/api/v1/dedication", base))
            .json(&json!({ "topic": topic })),
        Commands::References { topic } => client
            .post(format!("{}/api/v1/references", base))
            .json(&json!({ "topic": topic })),
        Commands::Paper {
            topic,
            chapters,
            parties,
            highlights,
        } => client.post(format!("{}/api/v1/paper", base)).json(&json!({
            "topic": topic,
            "numberOfChapters": chapters,
            "relevantParties": parties,
            "keyHighlights": highlights,
        })),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
