use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{Environment, HttpFetcher, OrganizationsView};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Fetch and render the organization listing once")]
struct Args {
    /// Config file stem; `environment` reads `environment.toml` and friends.
    #[arg(long, default_value = "environment")]
    config: String,
    /// Overrides `api_host` from the file and `APP__API_HOST`.
    #[arg(long)]
    api_host: Option<String>,
    /// Print the names as a JSON array instead of a list.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let environment = Environment::load(&args.config, args.api_host.as_deref())
        .context("invalid front-end environment")?;
    info!(api_host = environment.api_host(), "environment loaded");

    let fetcher = HttpFetcher::new(&environment)?;
    let mut view = OrganizationsView::new(Arc::new(fetcher));
    view.activate().await;

    if args.json {
        println!("{}", serde_json::to_string(view.organization_names())?);
    } else {
        println!("{}", view.title());
        for name in view.organization_names() {
            println!("- {name}");
        }
    }

    Ok(())
}
