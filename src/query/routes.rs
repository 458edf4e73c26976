use crate::error;
use crate::keychain::Keychain;
use crate::tracking::PositionSample;
use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub const STATUS_MESSAGE: &str = "Orbital Debris API is running";
pub const POSITIONS_ROUTE: &str = "/api/debris/positions";

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
pub struct StatusResponse {
    status: String,
}

impl StatusResponse {
    pub fn status(&self) -> &str { &self.status }
}

/// Read-only routes over the current snapshot.
pub fn router(keychain: Keychain) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route(POSITIONS_ROUTE, get(positions_handler))
        .with_state(keychain)
}

pub(crate) async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse { status: STATUS_MESSAGE.to_string() })
}

/// Propagates the current snapshot to "now". The snapshot reference is taken once up front,
/// a refresh finishing mid-request does not affect this response.
pub(crate) async fn positions_handler(
    State(keychain): State<Keychain>,
) -> Result<Json<Vec<PositionSample>>, StatusCode> {
    let snapshot = keychain.store().current().await;
    let service = keychain.service();
    let batch = tokio::task::spawn_blocking(move || service.current_batch(snapshot.as_deref()))
        .await
        .map_err(|e| {
            error!("Position computation aborted: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(batch.into_samples()))
}

/// Serves [`router`] on an already bound listener until `shutdown` is cancelled.
///
/// # Errors
/// Propagates I/O errors of the underlying server.
pub async fn serve_on(
    listener: TcpListener,
    keychain: Keychain,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, router(keychain))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

/// Binds `addr` and serves until `shutdown` is cancelled.
///
/// # Errors
/// Fails if `addr` cannot be bound or the server stops with an I/O error.
pub async fn serve(
    addr: SocketAddr,
    keychain: Keychain,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, keychain, shutdown).await
}
