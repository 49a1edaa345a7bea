//! Unified error type for the Arena service layer.

use arena_runtime::GameError;
use arena_stream::StreamError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Top-level error that wraps all layer-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts layer errors automatically. The
/// [`IntoResponse`] impl maps the taxonomy onto structured JSON bodies
/// of the shape `{"detail": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// A game lifecycle error (unknown id, bad config).
    #[error(transparent)]
    Game(#[from] GameError),

    /// An observer delivery error.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Binding or serving the HTTP listener failed.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

impl IntoResponse for ArenaError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::Game(GameError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Game not found".to_string())
            }
            Self::Game(GameError::ConfigInvalid(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Stream(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
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
    use arena_events::GameId;

    #[test]
    fn test_from_game_error() {
        let err: ArenaError = GameError::NotFound(GameId::new()).into();
        assert!(matches!(err, ArenaError::Game(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ArenaError = GameError::NotFound(GameId::new()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_config_invalid_maps_to_400() {
        let err: ArenaError = GameError::ConfigInvalid("bad".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
