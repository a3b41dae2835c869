mod action;
mod api;
mod app;
mod config;
mod dispatch;
mod event;
mod models;
mod store;
mod tui;
mod ui;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "tootbox", version, about = "A TUI client for Mastodon")]
struct Cli {
    /// Instance URL (e.g. https://mastodon.social)
    #[arg(short, long)]
    instance: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load()?;
    if let Some(instance) = cli.instance {
        config.instance_url = instance;
    }

    let client = Arc::new(api::client::MastodonClient::new());

    let mut terminal = tui::init()?;
    let result = app::App::new(config, client).run(&mut terminal).await;
    tui::restore()?;

    result
}
