//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the axum router: public routes, session-protected routes
//! - Wire middleware (request id, tracing, timeout, body limit, rate limit)
//! - Serve plain TCP or TLS with graceful shutdown
//! - Apply provider settings from config reloads while running

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::middleware::require_session;
use crate::auth::Auth;
use crate::config::{HubConfig, RankConfig};
use crate::http::handlers::{analytics, auth, import, pages, products, rank, seo, settings, social};
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::http::websocket::session_events;
use crate::observability::metrics;
use crate::providers::Providers;
use crate::security::{rate_limit_middleware, RateLimiterState};
use crate::store::Store;

/// Shared state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub auth: Auth,
    pub providers: Arc<Providers>,
    pub rank: RankConfig,
}

/// HTTP server for the seller hub.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: &HubConfig, state: AppState) -> Self {
        let router = Self::build_router(config, state.clone());
        Self { router, state }
    }

    /// The fully layered router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    #[allow(deprecated)]
    fn build_router(config: &HubConfig, state: AppState) -> Router {
        let public = Router::new()
            .route("/", get(pages::landing))
            .route("/health", get(pages::health))
            .route("/auth/signup", post(auth::sign_up))
            .route("/auth/signin", post(auth::sign_in))
            .route("/auth/signout", post(auth::sign_out))
            .route("/auth/events", get(session_events));

        let protected = Router::new()
            .route("/import", get(pages::import_view))
            .route("/import/products", post(import::import_products))
            .route("/import/sales", post(import::import_sales))
            .route("/import/products.csv", get(import::export_products))
            .route("/dashboard", get(pages::dashboard))
            .route("/products", get(products::list).post(products::create))
            .route(
                "/products/{id}",
                get(products::detail).patch(products::update).delete(products::remove),
            )
            .route("/seo", get(seo::reports))
            .route("/seo/{product_id}/variants", post(seo::variants))
            .route("/rank", get(rank::overview))
            .route("/rank/keywords", post(rank::add_keyword))
            .route("/rank/keywords/{id}", delete(rank::remove_keyword))
            .route("/rank/refresh", post(rank::refresh))
            .route("/social", get(social::list))
            .route("/social/{product_id}/generate", post(social::generate))
            .route("/social/export.csv", get(social::export))
            .route("/analytics", get(analytics::summary))
            .route("/analytics/demo", post(analytics::seed_demo))
            .route("/settings", get(settings::show).put(settings::update))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

        let mut app = public
            .merge(protected)
            .with_state(state)
            .layer(middleware::from_fn(track_requests));

        if config.rate_limit.enabled {
            let limiter = Arc::new(RateLimiterState::new(&config.rate_limit));
            app = app.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
        }

        app.layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(propagate_request_id_layer())
                .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                .layer(DefaultBodyLimit::max(config.security.max_body_size)),
        )
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<HubConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        spawn_config_reloader(self.state.providers.clone(), config_updates, shutdown.resubscribe());

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: axum_server::tls_rustls::RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<HubConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        spawn_config_reloader(self.state.providers.clone(), config_updates, shutdown.resubscribe());

        let handle = axum_server::Handle::new();
        let stopper = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            stopper.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Swap provider settings whenever the watched config file changes.
fn spawn_config_reloader(
    providers: Arc<Providers>,
    mut updates: mpsc::UnboundedReceiver<HubConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(config) => providers.replace(config.providers),
                    None => break,
                },
                _ = shutdown.recv() => break,
            }
        }
    });
}

async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
