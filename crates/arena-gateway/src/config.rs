//! Gateway configuration: the static route table and timeout knobs.
//!
//! The route table is immutable after startup. Each logical service name
//! maps to a REST base URL supplied by the operator; the WebSocket base
//! is derived from it by swapping the scheme (`http` → `ws`, `https` →
//! `wss`) and appending the conventional `/ws` mount point.

use std::collections::HashMap;
use std::time::Duration;

use crate::GatewayError;

/// Env var holding the gateway bind address.
pub const ENV_BIND_ADDR: &str = "ARENA_GATEWAY_ADDR";
/// Env var holding the route list, e.g.
/// `ARENA_SERVICES=codenames=http://codenames:8002,tic-tac-toe=http://tic-tac-toe:8000`.
pub const ENV_SERVICES: &str = "ARENA_SERVICES";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Static mapping from one logical service name to its upstream bases.
#[derive(Debug, Clone)]
pub struct ServiceRoute {
    /// Logical name clients use in `/api/{name}/...` and `/ws/{name}/...`.
    pub name: String,
    /// REST base, e.g. `http://codenames:8002`.
    pub rest_base: String,
    /// WebSocket base, e.g. `ws://codenames:8002/ws`.
    pub ws_base: String,
}

impl ServiceRoute {
    /// Builds a route from a logical name and a REST base URL.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] if the URL does not use an
    /// `http`/`https` scheme.
    pub fn new(name: &str, rest_base: &str) -> Result<Self, GatewayError> {
        let rest_base = rest_base.trim_end_matches('/');
        let ws_base = if let Some(rest) = rest_base.strip_prefix("http://") {
            format!("ws://{rest}/ws")
        } else if let Some(rest) = rest_base.strip_prefix("https://") {
            format!("wss://{rest}/ws")
        } else {
            return Err(GatewayError::Config(format!(
                "service '{name}': expected http(s) URL, got '{rest_base}'"
            )));
        };
        Ok(Self {
            name: name.to_string(),
            rest_base: rest_base.to_string(),
            ws_base,
        })
    }
}

/// Immutable name → upstream mapping, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, ServiceRoute>,
}

impl RouteTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a service route, replacing any previous entry for the name.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] on a malformed base URL.
    pub fn with_service(
        mut self,
        name: &str,
        rest_base: &str,
    ) -> Result<Self, GatewayError> {
        let route = ServiceRoute::new(name, rest_base)?;
        self.routes.insert(route.name.clone(), route);
        Ok(self)
    }

    /// Looks up a route by logical name.
    pub fn get(&self, name: &str) -> Option<&ServiceRoute> {
        self.routes.get(name)
    }

    /// Iterates all configured routes.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceRoute> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Parses a route list of the form `name=url,name=url,...`.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] on an entry without `=` or with a
    /// malformed URL; empty names are rejected too.
    pub fn parse(spec: &str) -> Result<Self, GatewayError> {
        let mut table = Self::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let Some((name, url)) = entry.split_once('=') else {
                return Err(GatewayError::Config(format!(
                    "route entry '{entry}': expected name=url"
                )));
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(GatewayError::Config(format!(
                    "route entry '{entry}': empty service name"
                )));
            }
            table = table.with_service(name, url.trim())?;
        }
        Ok(table)
    }
}

/// Everything the gateway needs to start.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the gateway listens on.
    pub bind_addr: String,
    /// The static route table.
    pub routes: RouteTable,
    /// Total per-request timeout for forwarded REST calls.
    pub upstream_timeout: Duration,
    /// Connect timeout for forwarded REST calls.
    pub connect_timeout: Duration,
    /// Per-service timeout for health probes.
    pub probe_timeout: Duration,
    /// A tunnel half that neither produces nor accepts a frame for this
    /// long is considered dead; the whole tunnel is torn down.
    pub tunnel_idle_timeout: Duration,
    /// Largest forwarded request body the gateway will buffer.
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            routes: RouteTable::new(),
            upstream_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(5),
            tunnel_idle_timeout: Duration::from_secs(300),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Creates a config with default timeouts and the given routes.
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes,
            ..Self::default()
        }
    }

    /// Sets the bind address.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the tunnel idle timeout.
    pub fn tunnel_idle_timeout(mut self, timeout: Duration) -> Self {
        self.tunnel_idle_timeout = timeout;
        self
    }

    /// Sets the upstream REST request timeout.
    pub fn upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Sets the health probe timeout.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Sets the forwarded request body cap.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Loads the config from `ARENA_GATEWAY_ADDR` and `ARENA_SERVICES`.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] if `ARENA_SERVICES` is unset or
    /// malformed.
    pub fn from_env() -> Result<Self, GatewayError> {
        let spec = std::env::var(ENV_SERVICES).map_err(|_| {
            GatewayError::Config(format!("{ENV_SERVICES} is not set"))
        })?;
        let routes = RouteTable::parse(&spec)?;
        if routes.is_empty() {
            return Err(GatewayError::Config(format!(
                "{ENV_SERVICES} configures no services"
            )));
        }

        let mut config = Self::new(routes);
        if let Ok(addr) = std::env::var(ENV_BIND_ADDR) {
            config.bind_addr = addr;
        }
        Ok(config)
    }
}
