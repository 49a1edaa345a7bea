//! Verbatim REST forwarding to upstream services.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::header;
use axum::response::Response;
use tracing::{debug, warn};

use crate::server::GatewayState;
use crate::GatewayError;

/// `/{method} /api/{service}/{*path}` — looks up the upstream REST base
/// and forwards the request verbatim: method, path, query, headers
/// (minus host routing) and body. The upstream response comes back
/// unmodified; the gateway never interprets it.
pub(crate) async fn forward_rest(
    State(state): State<Arc<GatewayState>>,
    Path((service, path)): Path<(String, String)>,
    request: Request,
) -> Result<Response, GatewayError> {
    let Some(route) = state.routes.get(&service) else {
        return Err(GatewayError::UnknownService(service));
    };

    let mut target = format!("{}/{path}", route.rest_base);
    if let Some(query) = request.uri().query() {
        target.push('?');
        target.push_str(query);
    }
    debug!(%service, method = %request.method(), %target, "forwarding request");

    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|_| GatewayError::PayloadTooLarge(state.max_body_bytes))?;

    let mut headers = parts.headers;
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    let upstream = state
        .client
        .request(parts.method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            warn!(%service, error = %e, "upstream request failed");
            GatewayError::Unavailable(service.clone())
        })?;

    let status = upstream.status();
    let mut response = Response::builder().status(status);
    if let Some(response_headers) = response.headers_mut() {
        for (name, value) in upstream.headers() {
            // The body is re-framed by this server.
            if *name == header::CONTENT_LENGTH
                || *name == header::TRANSFER_ENCODING
                || *name == header::CONNECTION
            {
                continue;
            }
            response_headers.insert(name.clone(), value.clone());
        }
    }

    let bytes = upstream
        .bytes()
        .await
        .map_err(|_| GatewayError::Unavailable(service.clone()))?;

    response
        .body(Body::from(bytes))
        .map_err(|e| GatewayError::Config(e.to_string()))
}
