//! HTTP surface over [`RegionService`].
//!
//! - `GET /search?destination=<name>` returns the cached region as JSON
//! - `GET /update` refreshes the cache from upstream
//!
//! Failures are reported as `{"HttpStatus": <code>, "Message": "<text>"}`.
//! Every response is labelled `application/json; charset=utf-8`.

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info, warn};

use crate::catalog::Region;
use crate::service::{RegionService, ServiceError};

/// Body returned with every error status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code, repeated in the body.
    #[serde(rename = "HttpStatus")]
    pub http_status: u16,
    /// Error description.
    #[serde(rename = "Message")]
    pub message: String,
}

/// Service error mapped onto an HTTP response.
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        Self(error)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Fetch(_) | ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = ErrorBody {
            http_status: status.as_u16(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    destination: String,
}

async fn search(
    State(service): State<Arc<RegionService>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Region>, ApiError> {
    let region = service.search(&params.destination).await?;
    Ok(Json(region))
}

async fn update(State(service): State<Arc<RegionService>>) -> Result<&'static str, ApiError> {
    service.update().await?;
    Ok("update successful")
}

/// Builds the application router.
pub fn router(service: Arc<RegionService>) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/update", get(update))
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        ))
        .with_state(service)
}

/// Serves the router on `listener` until `shutdown` resolves, then lets
/// in-flight requests finish.
///
/// # Errors
///
/// Returns the underlying IO error if the listener fails.
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<RegionService>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C, or SIGTERM / SIGQUIT on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::terminate()), signal(SignalKind::quit())) {
            (Ok(mut term), Ok(mut quit)) => {
                tokio::select! {
                    _ = term.recv() => {}
                    _ = quit.recv() => {}
                }
            }
            _ => {
                warn!("cannot listen for SIGTERM/SIGQUIT");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutting the server down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_uses_upstream_field_names() {
        let body = ErrorBody {
            http_status: 500,
            message: "db error".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap_or_default(),
            r#"{"HttpStatus":500,"Message":"db error"}"#
        );
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let error = ApiError::from(ServiceError::NotFound {
            name: "x".to_string(),
        });
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_fetch_failure_maps_to_500() {
        let error = ApiError::from(ServiceError::Fetch(crate::client::FetchError::http_status(
            "http://upstream.test/regions",
            502,
        )));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
