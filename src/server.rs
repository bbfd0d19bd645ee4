use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    catalog::Catalog,
    config::Config,
    handlers::{self, AppState},
    metrics,
    signals::shutdown_signal,
};

/// Paths served by the pricing API; the metrics endpoint must avoid them
pub const API_ROUTES: &[&str] = &[
    "/",
    "/health",
    "/get_price",
    "/get_price/",
    "/get_cost",
    "/machines",
    "/matching_machine_types",
    "/cheapest_region",
];

/// Where the Prometheus exposition is mounted
pub struct MetricsRoute {
    pub endpoint: String,
    pub handle: Arc<PrometheusHandle>,
}

/// Start the pricing API
///
/// This function:
/// 1. Initializes metrics (when enabled)
/// 2. Creates the Axum application around the loaded catalog
/// 3. Binds to the configured address
/// 4. Serves requests until SIGINT/SIGTERM
pub async fn start_server(config: Config, catalog: Catalog) -> Result<()> {
    let metrics_route = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        let handle = metrics::init_metrics()?;
        metrics::record_dataset_rows(catalog.machine_row_count());
        Some(MetricsRoute {
            endpoint: config.metrics.endpoint.clone(),
            handle: Arc::new(handle),
        })
    } else {
        None
    };

    let tables = catalog.tables().len();
    let regions = catalog.regions().len();
    let app = create_router(AppState::new(catalog), metrics_route);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting pricing API on {}", addr);
    info!(
        "Dataset: {} tables, {} supported regions",
        tables, regions
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState, metrics_route: Option<MetricsRoute>) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::root::welcome))
        .route("/health", get(handlers::root::health_check))
        .route("/get_price", post(handlers::pricing::get_price))
        .route("/get_price/", post(handlers::pricing::get_price))
        .route("/get_cost", get(handlers::pricing::get_cost))
        .route("/machines", get(handlers::pricing::list_machines))
        .route(
            "/matching_machine_types",
            get(handlers::pricing::matching_machine_types),
        )
        .route("/cheapest_region", get(handlers::pricing::cheapest_region))
        .with_state(state);

    if let Some(route) = metrics_route {
        app = app.merge(
            Router::new()
                .route(&route.endpoint, get(handlers::exposition::render_metrics))
                .with_state(route.handle),
        );
    }

    app.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn app_with_metrics_at(endpoint: &str) -> Router {
        let recorder = PrometheusBuilder::new().build_recorder();
        let metrics_route = MetricsRoute {
            endpoint: endpoint.to_string(),
            handle: Arc::new(recorder.handle()),
        };
        create_router(
            AppState::new(Catalog::with_default_regions(vec![])),
            Some(metrics_route),
        )
    }

    async fn status_of(app: Router, uri: &str) -> StatusCode {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_metrics_mounted_at_configured_endpoint() {
        let app = app_with_metrics_at("/internal/metrics");
        assert_eq!(status_of(app.clone(), "/internal/metrics").await, StatusCode::OK);
        assert_eq!(status_of(app, "/metrics").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_routes_are_all_mounted() {
        let app = create_router(AppState::new(Catalog::with_default_regions(vec![])), None);
        for route in API_ROUTES {
            assert_ne!(status_of(app.clone(), route).await, StatusCode::NOT_FOUND, "{}", route);
        }
    }

    #[tokio::test]
    async fn test_metrics_route_is_optional() {
        let app = create_router(AppState::new(Catalog::with_default_regions(vec![])), None);
        assert_eq!(status_of(app.clone(), "/metrics").await, StatusCode::NOT_FOUND);
        assert_eq!(status_of(app, "/").await, StatusCode::OK);
    }
}
