//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, aggregation timeout)
//! - Mount the config aggregation and path proxy routes
//! - Apply hot-reloaded configuration
//! - Serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::IntoResponse;
use axum::routing::{any, get};
use axum::{Json, Router};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::schema::GatewayConfig;
use crate::discovery::aggregator::ConfigAggregator;
use crate::discovery::resolver::{process_env, EnvLookup};
use crate::http::proxy::proxy_handler;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<GatewayConfig>>,
    pub aggregator: Arc<ConfigAggregator>,
    pub client: Client<HttpConnector, Body>,
    pub env: EnvLookup,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<ArcSwap<GatewayConfig>>,
    aggregator: Arc<ConfigAggregator>,
}

impl HttpServer {
    /// Create a new HTTP server reading the process environment.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_env(config, process_env())
    }

    /// Create a new HTTP server with an injected environment lookup.
    pub fn with_env(config: GatewayConfig, env: EnvLookup) -> Self {
        let config = Arc::new(ArcSwap::from_pointee(config));
        let aggregator = Arc::new(ConfigAggregator::new(config.clone(), env.clone()));

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            config: config.clone(),
            aggregator: aggregator.clone(),
            client,
            env,
        };

        let loaded = config.load_full();
        let router = Self::build_router(&loaded, state);
        Self {
            router,
            config,
            aggregator,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mount = config.proxy.mount_prefix.clone();

        // The proxy path carries no timeout of its own; the aggregation
        // route is bounded a little above the per-service fetch timeout.
        let aggregation = Router::new()
            .route("/api/config", get(config_handler))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.upstream.bindings_timeout_secs + 5,
            )));

        let proxy = Router::new()
            .route(&mount, any(proxy_handler))
            .route(&format!("{}/{{*path}}", mount), any(proxy_handler));

        Router::new()
            .merge(aggregation)
            .merge(proxy)
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Hot-reloaded configs arriving on `config_updates` are swapped in and
    /// invalidate the aggregation cache; the bind address and mount prefix
    /// are fixed for the process lifetime.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let config = self.config.clone();
        let aggregator = self.aggregator.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                tracing::info!(
                    services = new_config.services.len(),
                    cache_ttl_secs = new_config.cache.ttl_secs,
                    "Applying updated configuration"
                );
                config.store(Arc::new(new_config));
                aggregator.cache().clear();
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Handler for GET /api/config.
///
/// Always answers 200; callers detect degraded upstream data through the
/// optional errors list in the body.
async fn config_handler(State(state): State<AppState>, request: Request<Body>) -> impl IntoResponse {
    let start = Instant::now();
    let request_id = request.request_id().to_string();

    let aggregated = state.aggregator.get(Instant::now()).await;

    if !aggregated.errors.is_empty() {
        tracing::warn!(
            request_id = %request_id,
            failed_services = aggregated.errors.len(),
            "Serving degraded aggregated config"
        );
    }

    metrics::record_request("GET", 200, "config", start);
    Json(aggregated.as_ref().clone())
}
