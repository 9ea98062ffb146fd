use std::net::SocketAddr;
use std::sync::Arc;

use llm_prices_core::{Aggregator, ModelsResponse, CACHE_CONTROL};
use tracing::{info, warn};
use warp::Filter;

/// `GET /api/models` and `GET /health`.
pub fn routes(
    aggregator: Arc<Aggregator>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "OPTIONS"]);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "ok"})));

    // Every request recomputes the list; caching is left to intermediaries.
    let models = warp::path!("api" / "models")
        .and(warp::get())
        .and(warp::any().map(move || aggregator.clone()))
        .then(handle_models);

    health
        .or(models)
        .with(cors)
        .with(warp::trace::request())
}

/// Always 200: upstream failures only shrink the list.
async fn handle_models(aggregator: Arc<Aggregator>) -> impl warp::Reply {
    let models = aggregator.collect().await;
    info!(count = models.len(), "serving model list");
    warp::reply::with_header(
        warp::reply::json(&ModelsResponse::from(models)),
        "cache-control",
        CACHE_CONTROL,
    )
}

/// Serves until Ctrl-C. Fails without serving when `addr` cannot be bound.
pub async fn run(aggregator: Arc<Aggregator>, addr: SocketAddr) -> Result<(), warp::Error> {
    let (bound, server) = warp::serve(routes(aggregator))
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())?;
    info!("listening on http://{bound}");
    server.await;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
