mod app;
mod config;
mod error;
mod upload;
mod utils;
mod view;

use anyhow::{anyhow, Context};
use app::{RedactionUploader, Worker};
use clap::Parser;
use config::{AppConfig, Cli};
use eframe::CreationContext;
use tracing_subscriber::EnvFilter;
use upload::RedactionClient;

fn init_tracing(cli: &Cli) {
    let filter = match &cli.log_filter {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = AppConfig::from_cli(&cli).context("invalid server configuration")?;
    let client = RedactionClient::new(config.clone()).context("failed to build HTTP client")?;
    let worker = Worker::spawn(client).context("failed to start background worker")?;
    tracing::info!("Using redaction server at {}", config.server_url);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([720.0, 760.0])
            .with_min_inner_size([480.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Document Redaction & Evaluation",
        options,
        Box::new(move |cc: &CreationContext| {
            Box::new(RedactionUploader::new(cc, worker, config))
        }),
    )
    .map_err(|e| anyhow!("window failed: {e}"))
}
