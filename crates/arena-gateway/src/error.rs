//! Gateway error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Everything that can go wrong at the gateway layer.
///
/// The REST-visible variants carry the exact JSON bodies clients see:
/// an unknown service name is a 404 with `{"detail": "Unknown service"}`
/// and an unreachable upstream is a 503 with
/// `{"detail": "Service {name} is unavailable"}`. Upstream failures are
/// surfaced to the one affected request and never crash the router.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The logical service name is not in the route table.
    #[error("unknown service '{0}'")]
    UnknownService(String),

    /// The upstream refused the connection or timed out. Carries the
    /// logical service name for the response body.
    #[error("service '{0}' is unavailable")]
    Unavailable(String),

    /// A forwarded request body exceeded the configured buffer cap.
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// The upstream half of a WebSocket tunnel failed.
    #[error("upstream websocket error: {0}")]
    UpstreamWebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Startup configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Binding or serving the HTTP listener failed.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::UnknownService(_) => {
                (StatusCode::NOT_FOUND, "Unknown service".to_string())
            }
            Self::Unavailable(name) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Service {name} is unavailable"),
            ),
            Self::PayloadTooLarge(_) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            ),
            Self::UpstreamWebSocket(e) => {
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            Self::Config(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            Self::Server(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = serde_json::json!({ "detail": detail });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_service_maps_to_404() {
        let response =
            GatewayError::UnknownService("mr-white".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unavailable_maps_to_503() {
        let err = GatewayError::Unavailable("codenames".into());
        assert_eq!(err.to_string(), "service 'codenames' is unavailable");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
