use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use handyrec::{init_tracing, AppState, Config, ProviderRating, RankingError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "handyrec-server")]
struct Args {
    /// Configuration file; built-in defaults apply when omitted
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    service_category_id: i64,
    top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct TopRatedQuery {
    top_n: Option<usize>,
    detailed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }
}

/// Different callers need different shapes: the browsing page wants bare
/// ids, the featured-providers strip wants mean + count summaries.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum TopRatedResponse {
    Ids(Vec<i64>),
    Summaries(Vec<ProviderRating>),
}

fn error_status(e: &anyhow::Error) -> StatusCode {
    if e.downcast_ref::<RankingError>().is_some() {
        tracing::warn!("Rejected malformed ranking request: {}", e);
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!("Ranking request failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "handyrec-ranking".to_string());
    status.insert("version".to_string(), "0.1.0".to_string());

    Json(ApiResponse::success(status))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(params): Query<RecommendationQuery>,
) -> Result<Json<ApiResponse<Vec<i64>>>, StatusCode> {
    match state
        .ranking_service
        .recommend(user_id, params.service_category_id, params.top_n)
        .await
    {
        Ok(provider_ids) => Ok(Json(ApiResponse::success(provider_ids))),
        Err(e) => Err(error_status(&e)),
    }
}

async fn get_top_rated(
    State(state): State<AppState>,
    Path(service_category_id): Path<i64>,
    Query(params): Query<TopRatedQuery>,
) -> Result<Json<ApiResponse<TopRatedResponse>>, StatusCode> {
    let response = if params.detailed.unwrap_or(false) {
        state
            .ranking_service
            .top_rated_summaries(service_category_id, params.top_n)
            .await
            .map(TopRatedResponse::Summaries)
    } else {
        state
            .ranking_service
            .top_rated(service_category_id, params.top_n)
            .await
            .map(TopRatedResponse::Ids)
    };

    match response {
        Ok(data) => Ok(Json(ApiResponse::success(data))),
        Err(e) => Err(error_status(&e)),
    }
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommendations/:user_id", get(get_recommendations))
        .route(
            "/providers/top-rated/:service_category_id",
            get(get_top_rated),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().await;

    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    info!(
        "Starting HandyRec ranking server with config: {:?}",
        config.server
    );

    let state = AppState::new(config.clone()).await?;
    let app = create_router(state);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
