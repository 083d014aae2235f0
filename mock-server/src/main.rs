use std::{collections::HashMap, path::PathBuf};

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let blobs = match std::env::var_os("BLOB_DIR") {
        Some(dir) => mock_server::load_dir(&PathBuf::from(dir))?,
        None => HashMap::new(),
    };
    let mirrors: Vec<String> = std::env::var("MIRRORS")
        .map(|m| m.split(',').map(str::trim).filter(|m| !m.is_empty()).map(str::to_string).collect())
        .unwrap_or_default();

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(blobs = blobs.len(), mirrors = mirrors.len(), "listening on {addr}");
    mock_server::run(listener, mock_server::app(blobs, mirrors)).await
}
