use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single rating event a customer left for a provider.
///
/// The feedback table may hold several records per (user, provider) pair;
/// reducing them to one matrix cell is the ranking core's job.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeedbackRecord {
    pub user_id: i64,
    pub provider_id: i64,
    pub rating: f32,
    pub created_at: DateTime<Utc>,
}

/// Association of a provider with the single service category it offers.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProviderCategory {
    pub provider_id: i64,
    pub service_category_id: i64,
}

/// Leaderboard summary for one provider: arithmetic mean of all its
/// ratings plus how many ratings went into the mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRating {
    pub provider_id: i64,
    pub mean_rating: f32,
    pub rating_count: u64,
}

impl FeedbackRecord {
    pub fn new(user_id: i64, provider_id: i64, rating: f32) -> Self {
        Self {
            user_id,
            provider_id,
            rating,
            created_at: Utc::now(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

impl ProviderCategory {
    pub fn new(provider_id: i64, service_category_id: i64) -> Self {
        Self {
            provider_id,
            service_category_id,
        }
    }
}
