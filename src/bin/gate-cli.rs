use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Command-line client for the chat gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Username sent as X-User.
    #[arg(long, default_value = "operator")]
    user: String,

    /// Role sent as X-User-Role.
    #[arg(long, default_value = "admin")]
    role: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// Show per-client rate limit usage
    RateLimits,
    /// Post a message
    Send { content: String },
    /// List messages, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert("x-user", HeaderValue::from_str(&cli.user)?);
    headers.insert("x-user-role", HeaderValue::from_str(&cli.role)?);

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::RateLimits => client.get(format!("{}/admin/rate-limits", cli.url)),
        Commands::Send { content } => client
            .post(format!("{}/api/messages/", cli.url))
            .json(&serde_json::json!({ "content": content })),
        Commands::List { page, page_size } => {
            let mut query = vec![("page", page.to_string())];
            if let Some(size) = page_size {
                query.push(("page_size", size.to_string()));
            }
            client.get(format!("{}/api/messages/", cli.url)).query(&query)
        }
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Some(retry) = res.headers().get("retry-after").and_then(|v| v.to_str().ok()) {
            eprintln!("Retry after: {}s", retry);
        }
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
