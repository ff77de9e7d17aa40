//! Serve randomized phrase-bingo cards over HTTP.

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use log::info;

use bingo::{server, CardStore};

/// Serve randomized phrase-bingo cards over HTTP.
#[derive(Debug, Parser)]
#[command(name = "bingo", version)]
struct Args {
    /// Directory where card records are stored.
    #[arg(long, default_value = "./cards")]
    data_dir: PathBuf,

    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = CardStore::open(&args.data_dir).with_context(|| {
        format!("could not open card store in {}", args.data_dir.display())
    })?;
    let app = server::router(store)?;

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("could not bind {}", args.listen))?;
    info!("listening on http://{}", args.listen);
    axum::serve(listener, app).await?;
    Ok(())
}
