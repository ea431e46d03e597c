//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, limits, security policies)
//! - Apply configuration reloads to the shared state
//! - Serve until the shutdown signal fires

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin;
use crate::config::GateConfig;
use crate::http::messages::{create_message, health_handler, list_messages};
use crate::http::request::{
    propagate_request_id_layer, request_logging_middleware, set_request_id_layer,
};
use crate::http::response::security_headers_middleware;
use crate::messages::MessageStore;
use crate::security::access_hours::access_hours_middleware;
use crate::security::rate_limit::rate_limit_middleware;
use crate::security::roles::{identity_middleware, role_permission_middleware};
use crate::security::SlidingWindowLimiter;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<GateConfig>>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub messages: Arc<MessageStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: GateConfig) -> Self {
        let limiter = SlidingWindowLimiter::from_config(&config.rate_limit);
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            limiter: Arc::new(limiter),
            messages: Arc::new(MessageStore::new()),
            started_at: Instant::now(),
        }
    }

    /// Swap in a new configuration. The listener address, timeout and body
    /// limit are fixed at startup; everything else takes effect immediately.
    pub fn apply_config(&self, config: GateConfig) {
        let current = self.config.load_full();
        if current.listener.bind_address != config.listener.bind_address {
            tracing::warn!(
                current = %current.listener.bind_address,
                requested = %config.listener.bind_address,
                "Listener address changes require a restart"
            );
        }

        self.limiter
            .set_limits(config.rate_limit.max_requests, config.rate_limit.window());
        tracing::info!(
            max_requests = config.rate_limit.max_requests,
            window_secs = config.rate_limit.window_secs,
            access_hours = config.access_hours.enabled,
            "Configuration applied"
        );
        self.config.store(Arc::new(config));
    }
}

/// HTTP server for the chat gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig) -> Self {
        let state = AppState::new(config);
        let router = Self::build_router(&state);
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost-last: request ID, tracing, timeout and body
    /// limit first, then identity, logging, hours, rate limit, roles.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let config = state.config.load_full();

        Router::new()
            .route("/health", get(health_handler))
            .route("/api/messages", get(list_messages).post(create_message))
            .route("/api/messages/", get(list_messages).post(create_message))
            .merge(admin::routes())
            .with_state(state.clone())
            .layer(middleware::from_fn_with_state(state.clone(), role_permission_middleware))
            .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
            .layer(middleware::from_fn_with_state(state.clone(), access_hours_middleware))
            .layer(middleware::from_fn(request_logging_middleware))
            .layer(middleware::from_fn(identity_middleware))
            .layer(middleware::from_fn_with_state(state.clone(), security_headers_middleware))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Shared state, for wiring and inspection.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// A clone of the fully layered router.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, applying config updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GateConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.apply_config(config);
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
