//! Upload URL Issuer - presigned S3 upload URLs as a Lambda function
//!
//! Runs the Lambda runtime loop by default. `issue` signs a single URL
//! locally and prints the response.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use upload_url_issuer::{config::Config, s3::S3Presigner, server::Server, UrlIssuer};

/// Upload URL Issuer - presigned S3 upload URLs
#[derive(Parser, Debug)]
#[command(name = "upload-url-issuer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file (defaults to the environment)
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve Lambda invocations (default)
    Serve,
    /// Issue one upload URL and print the response
    Issue {
        /// Object key to authorize
        #[arg(short, long)]
        file_name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // CloudWatch timestamps each line
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Upload URL Issuer v{}", upload_url_issuer::VERSION);

    // Load configuration
    let config = match args.config {
        Some(ref path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::from_env()?,
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let server = Server::new(config).await;
            server.run().await?;
        }
        Command::Issue { file_name } => {
            let presigner = S3Presigner::from_config(&config).await;
            let issuer = UrlIssuer::new(presigner, config);
            let response = issuer.issue(&file_name).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
