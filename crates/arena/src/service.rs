//! `ArenaService` builder and server lifecycle.
//!
//! Ties the layers together for one game backend: runtime → events →
//! stream → HTTP/WebSocket surface.

use std::sync::Arc;

use arena_runtime::{GameDriver, GameManager};
use arena_stream::ConnectionRegistry;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::routes::build_router;
use crate::ArenaError;

/// Shared service state injected into every handler.
///
/// The manager mutex is scoped to single registry operations
/// (insert/remove/lookup) — it is never held across the lifetime of a
/// game; per-game state lives behind each game's own lock.
pub(crate) struct ServiceState<D: GameDriver> {
    pub(crate) manager: Mutex<GameManager<D>>,
    pub(crate) registry: ConnectionRegistry,
    pub(crate) service_name: String,
    pub(crate) version: String,
}

/// Builder for configuring and starting an Arena game service.
///
/// # Example
///
/// ```rust,ignore
/// use arena::prelude::*;
///
/// let service = ArenaService::builder()
///     .bind("0.0.0.0:8000")
///     .service_name("codenames")
///     .build::<CodenamesDriver>()
///     .await?;
/// service.run().await
/// ```
pub struct ArenaServiceBuilder {
    bind_addr: String,
    service_name: String,
    version: String,
    event_capacity: usize,
}

impl ArenaServiceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            service_name: "arena".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            event_capacity: arena_events::DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Sets the address to bind the service to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the logical service name reported by `/health`.
    pub fn service_name(mut self, name: &str) -> Self {
        self.service_name = name.to_string();
        self
    }

    /// Sets the version string reported by `/health`.
    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Sets the per-game retained-event cap.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Binds the listener and builds the service.
    ///
    /// # Errors
    /// Returns [`ArenaError::Server`] if the address cannot be bound.
    pub async fn build<D: GameDriver>(
        self,
    ) -> Result<ArenaService<D>, ArenaError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(
            addr = %self.bind_addr,
            service = %self.service_name,
            "arena service listening"
        );

        let state = Arc::new(ServiceState {
            manager: Mutex::new(GameManager::with_event_capacity(
                self.event_capacity,
            )),
            registry: ConnectionRegistry::new(),
            service_name: self.service_name,
            version: self.version,
        });

        Ok(ArenaService { listener, state })
    }
}

impl Default for ArenaServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound, ready-to-run Arena game service.
///
/// Call [`run()`](Self::run) to serve requests until the process is
/// terminated.
pub struct ArenaService<D: GameDriver> {
    listener: TcpListener,
    state: Arc<ServiceState<D>>,
}

impl<D: GameDriver> ArenaService<D> {
    /// Creates a new builder.
    pub fn builder() -> ArenaServiceBuilder {
        ArenaServiceBuilder::new()
    }

    /// Returns the local address the service is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves the REST + WebSocket surface until terminated.
    ///
    /// # Errors
    /// Returns [`ArenaError::Server`] on a fatal I/O error.
    pub async fn run(self) -> Result<(), ArenaError> {
        let router = build_router(Arc::clone(&self.state));
        tracing::info!("arena service running");
        axum::serve(self.listener, router).await?;
        Ok(())
    }
}
