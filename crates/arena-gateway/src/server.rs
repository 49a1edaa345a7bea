//! Gateway construction and server lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::{GatewayConfig, RouteTable};
use crate::routes::build_router;
use crate::GatewayError;

/// Shared gateway state injected into every handler.
///
/// The route table is read-only after startup; the HTTP client is one
/// shared connection pool with bounded timeouts.
pub(crate) struct GatewayState {
    pub(crate) routes: RouteTable,
    pub(crate) client: reqwest::Client,
    pub(crate) probe_timeout: Duration,
    pub(crate) tunnel_idle_timeout: Duration,
    pub(crate) max_body_bytes: usize,
}

/// A bound, ready-to-run gateway.
pub struct Gateway {
    listener: TcpListener,
    state: Arc<GatewayState>,
}

impl Gateway {
    /// Binds the listener and builds the shared state.
    ///
    /// # Errors
    /// Returns [`GatewayError::Server`] if the address cannot be bound
    /// and [`GatewayError::Config`] if the HTTP client cannot be built.
    pub async fn bind(config: GatewayConfig) -> Result<Self, GatewayError> {
        let listener = TcpListener::bind(&config.bind_addr).await?;

        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        for route in config.routes.iter() {
            tracing::info!(
                service = %route.name,
                rest = %route.rest_base,
                ws = %route.ws_base,
                "route configured"
            );
        }
        tracing::info!(
            addr = %config.bind_addr,
            services = config.routes.len(),
            "gateway listening"
        );

        Ok(Self {
            listener,
            state: Arc::new(GatewayState {
                routes: config.routes,
                client,
                probe_timeout: config.probe_timeout,
                tunnel_idle_timeout: config.tunnel_idle_timeout,
                max_body_bytes: config.max_body_bytes,
            }),
        })
    }

    /// Returns the local address the gateway is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves proxy, tunnel, and health routes until terminated.
    ///
    /// # Errors
    /// Returns [`GatewayError::Server`] on a fatal I/O error.
    pub async fn run(self) -> Result<(), GatewayError> {
        let router = build_router(Arc::clone(&self.state));
        axum::serve(self.listener, router).await?;
        Ok(())
    }
}
