pub mod matrix;
pub mod popularity;
pub mod similarity;

use crate::config::Config;
use crate::models::*;
use crate::store::FeedbackStore;
use anyhow::Result;
use dashmap::DashMap;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

/// Malformed-call errors. "No data for this query" is never an error; it is
/// the [`Recommendations::NoData`] value, so callers can chain strategies.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("top_n must be positive, got {0}")]
    InvalidTopN(usize),
    #[error("top_n {got} exceeds the configured maximum of {max}")]
    TopNTooLarge { got: usize, max: usize },
}

/// Outcome of a personalized ranking query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendations {
    /// No personalization signal; try the next strategy.
    NoData,
    /// Ranked provider ids, most relevant first. Never empty.
    Ranked(Vec<i64>),
}

impl Recommendations {
    pub fn into_ids(self) -> Vec<i64> {
        match self {
            Recommendations::NoData => Vec::new(),
            Recommendations::Ranked(ids) => ids,
        }
    }
}

/// Stateless-per-call ranking facade over the feedback store.
///
/// Every query rebuilds its working data from a fresh snapshot read; the
/// only cross-call state is the optional leaderboard cache, which is a
/// performance lever and never a correctness requirement.
pub struct RankingService {
    store: Arc<dyn FeedbackStore>,
    redis_client: Arc<redis::Client>,
    config: Arc<Config>,
    leaderboard_cache: DashMap<(i64, usize), (Instant, Vec<ProviderRating>)>,
}

impl RankingService {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        redis_client: Arc<redis::Client>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            redis_client,
            config,
            leaderboard_cache: DashMap::new(),
        }
    }

    fn effective_top_n(&self, top_n: Option<usize>) -> Result<usize, RankingError> {
        let n = top_n.unwrap_or(self.config.ranking.default_top_n);
        if n == 0 {
            return Err(RankingError::InvalidTopN(n));
        }
        if n > self.config.ranking.max_top_n {
            return Err(RankingError::TopNTooLarge {
                got: n,
                max: self.config.ranking.max_top_n,
            });
        }
        Ok(n)
    }

    async fn load_snapshot(&self) -> Result<(Vec<FeedbackRecord>, Vec<ProviderCategory>)> {
        Ok(tokio::try_join!(
            self.store.load_feedback(),
            self.store.load_provider_categories()
        )?)
    }

    /// Personalized ranking for one user within one category. `NoData`
    /// signals the caller to fall back to [`Self::top_rated`].
    pub async fn rank(
        &self,
        user_id: i64,
        service_category_id: i64,
        top_n: Option<usize>,
    ) -> Result<Recommendations> {
        let top_n = self.effective_top_n(top_n)?;
        let (feedback, categories) = self.load_snapshot().await?;
        Ok(similarity::rank(
            &feedback,
            &categories,
            user_id,
            service_category_id,
            top_n,
        )?)
    }

    /// The full recommendation flow the browsing feature uses: personalized
    /// ranking first, category leaderboard when personalization has nothing
    /// to say.
    pub async fn recommend(
        &self,
        user_id: i64,
        service_category_id: i64,
        top_n: Option<usize>,
    ) -> Result<Vec<i64>> {
        match self.rank(user_id, service_category_id, top_n).await? {
            Recommendations::Ranked(ids) => Ok(ids),
            Recommendations::NoData => {
                info!(
                    user_id,
                    service_category_id, "no personalization signal, serving category leaderboard"
                );
                self.top_rated(service_category_id, top_n).await
            }
        }
    }

    pub async fn top_rated(
        &self,
        service_category_id: i64,
        top_n: Option<usize>,
    ) -> Result<Vec<i64>> {
        Ok(self
            .top_rated_summaries(service_category_id, top_n)
            .await?
            .into_iter()
            .map(|summary| summary.provider_id)
            .collect())
    }

    pub async fn top_rated_summaries(
        &self,
        service_category_id: i64,
        top_n: Option<usize>,
    ) -> Result<Vec<ProviderRating>> {
        let top_n = self.effective_top_n(top_n)?;
        let cache_key = (service_category_id, top_n);
        let ttl = Duration::from_secs(self.config.ranking.leaderboard_ttl_seconds);

        if let Some(entry) = self.leaderboard_cache.get(&cache_key) {
            if entry.0.elapsed() < ttl {
                return Ok(entry.1.clone());
            }
        }

        if let Some(summaries) = self.fetch_cached_leaderboard(service_category_id, top_n).await {
            self.leaderboard_cache
                .insert(cache_key, (Instant::now(), summaries.clone()));
            return Ok(summaries);
        }

        let (feedback, categories) = self.load_snapshot().await?;
        let summaries =
            popularity::top_rated_summaries(&feedback, &categories, service_category_id, top_n)?;

        self.leaderboard_cache
            .insert(cache_key, (Instant::now(), summaries.clone()));
        self.store_cached_leaderboard(service_category_id, top_n, &summaries)
            .await;

        Ok(summaries)
    }

    // Redis caching is best-effort: an unreachable cache degrades to
    // recomputation, never to a failed request.
    async fn fetch_cached_leaderboard(
        &self,
        service_category_id: i64,
        top_n: usize,
    ) -> Option<Vec<ProviderRating>> {
        let mut conn = self.redis_client.get_async_connection().await.ok()?;
        let key = format!("leaderboard:{}:{}", service_category_id, top_n);
        let raw: String = conn.get(&key).await.ok()?;
        serde_json::from_str(&raw).ok()
    }

    async fn store_cached_leaderboard(
        &self,
        service_category_id: i64,
        top_n: usize,
        summaries: &[ProviderRating],
    ) {
        let Ok(mut conn) = self.redis_client.get_async_connection().await else {
            return;
        };
        let Ok(payload) = serde_json::to_string(summaries) else {
            return;
        };
        let key = format!("leaderboard:{}:{}", service_category_id, top_n);
        if let Err(e) = conn
            .set_ex::<_, _, ()>(&key, payload, self.config.redis.ttl_seconds)
            .await
        {
            warn!("Failed to cache leaderboard {}: {}", key, e);
        }
    }
}
