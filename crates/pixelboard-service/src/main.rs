use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::{info, warn};
use pixelboard_service::http::{AppState, handle};
use pixelboard_service::store::{MemoryStore, snapshot};
use tokio::net::TcpListener;

/// pixelboard-service: renders the collaborative pixel boards.
///
/// Boards are served as PNG images over HTTP, with an optional
/// reference grid drawn around them.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Opts {
    /// Address to bind for the HTTP service.
    #[arg(long, env = "PIXELBOARD_LISTEN_ADDR", default_value = "0.0.0.0:7896")]
    listen_addr: String,

    /// JSON snapshot of the boards to serve.
    #[arg(long, env = "PIXELBOARD_SNAPSHOT")]
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    env_logger::init();
    info!("pixelboard-service starting...");

    let store = match &opts.snapshot {
        Some(path) => snapshot::load(path)
            .with_context(|| format!("failed to load snapshot {}", path.display()))?,
        None => {
            warn!("No snapshot given, serving an empty store");
            MemoryStore::new()
        }
    };
    let state = Arc::new(AppState::new(store));

    let listener = TcpListener::bind(&opts.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", opts.listen_addr))?;
    info!("HTTP service listening on {}", opts.listen_addr);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Received Ctrl+C signal");
                break;
            }
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((socket, addr)) => {
                        info!("New connection from {}", addr);
                        let state = Arc::clone(&state);
                        tokio::spawn(async move {
                            let service = service_fn(move |req| handle(Arc::clone(&state), req));
                            if let Err(e) = http1::Builder::new()
                                .serve_connection(TokioIo::new(socket), service)
                                .await
                            {
                                warn!("Error serving connection from {}: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                    }
                }
            }
        }
    }

    info!("pixelboard-service shutting down.");
    Ok(())
}
