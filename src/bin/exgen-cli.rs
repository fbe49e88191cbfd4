use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use exgen_gateway::config::ObservabilityConfig;
use exgen_gateway::observability::logging;
use exgen_gateway::role::{FileStore, HttpRoleFetcher, Requester, RoleCache};

#[derive(Parser)]
#[command(name = "exgen-cli")]
#[command(about = "Client tooling for the exgen API gateway", long_about = None)]
struct Cli {
    /// Gateway base URL.
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Directory holding the persisted role cache.
    #[arg(long, env = "EXGEN_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the signed-in user's role (cached for five minutes)
    Role {
        #[arg(long)]
        subject: String,
        #[arg(long, env = "EXGEN_TOKEN")]
        token: String,
    },
    /// Drop the cached role for a subject
    ForgetRole {
        #[arg(long)]
        subject: String,
    },
    /// Call a named backend endpoint through the proxy
    Proxy {
        #[arg(long, default_value = "health")]
        endpoint: String,
    },
    /// Upload a file to a named backend endpoint as multipart form data
    Upload {
        #[arg(long, default_value = "generate")]
        endpoint: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "file")]
        field: String,
    },
    /// Check gateway liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&ObservabilityConfig {
        log_level: "warn".to_string(),
        ..ObservabilityConfig::default()
    });

    let client = reqwest::Client::new();
    let cache_dir = cli
        .cache_dir
        .unwrap_or_else(|| std::env::temp_dir().join("exgen-cli"));

    match cli.command {
        Commands::Role { subject, token } => {
            let cache = role_cache(&cli.url, cache_dir)?;
            let role = cache.get_role(Some(&Requester::new(subject, token))).await?;
            println!("{}", serde_json::to_string_pretty(&role)?);

            let stats = cache.stats();
            eprintln!(
                "api calls: {}, cache hits: {}, avg response: {:.0}ms",
                stats.api_calls, stats.cache_hits, stats.average_response_ms
            );
        }
        Commands::ForgetRole { subject } => {
            role_cache(&cli.url, cache_dir)?.forget_role(&subject);
            println!("Forgot cached role for {subject}");
        }
        Commands::Proxy { endpoint } => {
            let res = client
                .get(format!("{}/api/proxy", cli.url))
                .query(&[("endpoint", endpoint)])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Upload {
            endpoint,
            file,
            field,
        } => {
            let bytes = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            let form = Form::new().part(field, Part::bytes(bytes).file_name(file_name));

            let res = client
                .post(format!("{}/api/proxy", cli.url))
                .query(&[("endpoint", endpoint)])
                .multipart(form)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/healthz", cli.url)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn role_cache(url: &str, cache_dir: PathBuf) -> Result<RoleCache, Box<dyn std::error::Error>> {
    let fetcher = HttpRoleFetcher::new(url)?;
    let cache = RoleCache::new(Arc::new(fetcher), Arc::new(FileStore::new(cache_dir)));
    cache.load();
    Ok(cache)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
