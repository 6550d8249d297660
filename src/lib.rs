pub mod config;
pub mod models;
pub mod ranking;
pub mod store;
pub mod utils;

pub use config::Config;
pub use models::*;
pub use ranking::{RankingError, RankingService, Recommendations};

use anyhow::Result;
use std::sync::Arc;
use store::{FeedbackStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn FeedbackStore>,
    pub ranking_service: Arc<RankingService>,
    pub redis_client: Arc<redis::Client>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let store: Arc<dyn FeedbackStore> = Arc::new(PgStore::connect(config.clone()).await?);

        let redis_client = Arc::new(redis::Client::open(config.redis.url.as_str())?);

        let ranking_service = Arc::new(RankingService::new(
            store.clone(),
            redis_client.clone(),
            config.clone(),
        ));

        Ok(Self {
            config,
            store,
            ranking_service,
            redis_client,
        })
    }
}

pub async fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
