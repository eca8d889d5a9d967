//! fusefeed-server: serve fused Atom/RSS feeds defined by spec files on disk.

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

mod cli;
mod feed_store;
mod routes;

use cli::Cli;
use feed_store::FeedStore;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let store = Arc::new(FeedStore::new(cli.feeds_dir()));
    let port = cli.port.unwrap_or(DEFAULT_PORT);

    let app = routes::router(store);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .wrap_err_with(|| format!("unable to bind to port {port}"))?;

    tracing::info!(port, "fusefeed-server listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.wrap_err("server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let level = if cli.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("fusefeed={level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
