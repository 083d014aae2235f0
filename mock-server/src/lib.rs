//! Local blob server for exercising the HTTPS store end to end.
//!
//! Serves `GET /blobs/{name}` from an in-memory map. Every configured mirror
//! is advertised on successful responses as a `Link: <...>; rel=duplicate`
//! header.

use std::{collections::HashMap, io, path::Path as FsPath, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{
        header::{CONTENT_TYPE, LINK},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
pub use bytes::Bytes;
use tokio::net::TcpListener;
use tracing::debug;

pub type BlobDb = Arc<HashMap<String, Bytes>>;

#[derive(Clone)]
struct AppState {
    blobs: BlobDb,
    mirrors: Arc<Vec<String>>,
}

pub fn app(blobs: HashMap<String, Bytes>, mirrors: Vec<String>) -> Router {
    let state = AppState {
        blobs: Arc::new(blobs),
        mirrors: Arc::new(mirrors),
    };
    Router::new()
        .route("/blobs/{name}", get(get_blob))
        .with_state(state)
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), io::Error> {
    axum::serve(listener, app).await
}

/// Reads every regular file in `dir` into a blob keyed by its file name.
pub fn load_dir(dir: &FsPath) -> io::Result<HashMap<String, Bytes>> {
    let mut blobs = HashMap::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        blobs.insert(name, Bytes::from(std::fs::read(entry.path())?));
    }
    Ok(blobs)
}

async fn get_blob(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(blob) = state.blobs.get(&name).cloned() else {
        debug!(%name, "blob not found");
        return (StatusCode::NOT_FOUND, format!("blob {name} not found")).into_response();
    };

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"));
    for mirror in state.mirrors.iter() {
        let link = format!("<{}/blobs/{name}>; rel=duplicate", mirror.trim_end_matches('/'));
        if let Ok(value) = HeaderValue::from_str(&link) {
            headers.append(LINK, value);
        }
    }
    debug!(%name, len = blob.len(), "serving blob");
    (StatusCode::OK, headers, blob).into_response()
}
