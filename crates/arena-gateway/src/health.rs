//! Aggregated health across all configured services.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use futures::future::join_all;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ServiceRoute;
use crate::server::GatewayState;

/// `GET /health` — probes every service's `/health` concurrently and
/// returns the full map even when some probes fail. One slow service
/// bounds the latency of the whole call (per-probe timeout), never the
/// sum of all probes.
pub(crate) async fn aggregate_health(
    State(state): State<Arc<GatewayState>>,
) -> Json<Value> {
    let probes = state.routes.iter().map(|route| probe(&state, route));
    let results = join_all(probes).await;

    let degraded = results
        .iter()
        .any(|(_, report)| report["status"] != "healthy");
    let services: serde_json::Map<String, Value> = results
        .into_iter()
        .map(|(name, report)| (name, report))
        .collect();

    Json(json!({
        "status": if degraded { "degraded" } else { "healthy" },
        "services": services,
    }))
}

/// Probes one service, never failing: an unreachable or slow upstream
/// yields `{"status": "unreachable"}` for its entry only.
async fn probe(
    state: &GatewayState,
    route: &ServiceRoute,
) -> (String, Value) {
    let url = format!("{}/health", route.rest_base);
    let report = match state
        .client
        .get(&url)
        .timeout(state.probe_timeout)
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| json!({ "status": "healthy" })),
        Ok(response) => {
            debug!(service = %route.name, status = %response.status(), "unhealthy probe");
            json!({ "status": "unhealthy" })
        }
        Err(e) => {
            debug!(service = %route.name, error = %e, "unreachable probe");
            json!({ "status": "unreachable" })
        }
    };
    (route.name.clone(), report)
}
