use super::FeedbackStore;
use crate::config::Config;
use crate::models::*;
use crate::utils::validation;
use anyhow::Result;
use futures::TryStreamExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

/// Feedback store backed by the marketplace's Postgres database.
///
/// The casts pin the wire types: the marketplace schema stores ids and
/// ratings as plain integers, the core works with bigint ids and real
/// ratings.
pub struct PgStore {
    pool: PgPool,
    config: Arc<Config>,
}

impl PgStore {
    pub async fn connect(config: Arc<Config>) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.postgres.max_connections)
            .connect(&config.postgres.url)
            .await?;

        info!("Connected to postgres");
        Ok(Self { pool, config })
    }
}

#[async_trait::async_trait]
impl FeedbackStore for PgStore {
    async fn load_feedback(&self) -> Result<Vec<FeedbackRecord>> {
        let rows: Vec<FeedbackRecord> = sqlx::query_as(
            "SELECT user_id::BIGINT AS user_id, \
                    provider_id::BIGINT AS provider_id, \
                    rating::REAL AS rating, \
                    created_at::TIMESTAMPTZ AS created_at \
             FROM feedback",
        )
        .fetch(&self.pool)
        .try_collect()
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for record in rows {
            match validation::validate_feedback_record(&record, &self.config.ranking) {
                Ok(()) => records.push(record),
                Err(e) => warn!("Skipping malformed feedback row: {}", e),
            }
        }
        Ok(records)
    }

    async fn load_provider_categories(&self) -> Result<Vec<ProviderCategory>> {
        let rows: Vec<ProviderCategory> = sqlx::query_as(
            "SELECT id::BIGINT AS provider_id, \
                    service_id::BIGINT AS service_category_id \
             FROM provider",
        )
        .fetch(&self.pool)
        .try_collect()
        .await?;

        let mut associations = Vec::with_capacity(rows.len());
        for association in rows {
            match validation::validate_provider_category(&association) {
                Ok(()) => associations.push(association),
                Err(e) => warn!("Skipping malformed provider row: {}", e),
            }
        }
        Ok(associations)
    }
}
