//! foodbooks main entry point

use anyhow::Context;
use clap::Parser;
use foodbooks_api::start_server;
use foodbooks_config::Config;
use foodbooks_core::{Books, HttpRemote};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "foodbooks")]
#[command(version)]
#[command(about = "JSON API over a food-production company's sales, receipts and inventory records", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the documented default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_details());
            return Err(e).with_context(|| format!("Failed to load configuration from {}", args.config.display()));
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();
    log::info!("Config loaded from {}, remote API at {}", args.config.display(), config.remote.base_url);

    let remote = Arc::new(HttpRemote::new(config.remote.clone()));
    let books = Arc::new(Books::new(remote));

    if config.remote.refresh_on_start {
        let report = books.refresh_all().await;
        if report.is_complete() {
            log::info!("Loaded {} collections", report.refreshed.len());
        } else {
            for (kind, message) in &report.failed {
                log::warn!("Could not load {}: {}", kind, message);
            }
        }
    }

    start_server(config, books).await.context("Server error")
}
