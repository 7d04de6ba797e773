mod app;
mod backend;
mod cli;
mod config;
mod error;
mod state;
mod task;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "sbrw_utility=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    let backend = cli::backend_for(cli.data_dir)?;

    if let Some(command) = cli.command {
        return cli::run(command, cli.output, backend).await;
    }

    tracing::info!("Starting SBRW utility");

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([640.0, 520.0])
        .with_min_inner_size([480.0, 400.0])
        .with_title("SBRW Utility");

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "SBRW Utility",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::SbrwApp::new(cc, backend)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))?;

    Ok(())
}
