use super::FeedbackStore;
use crate::models::*;
use anyhow::Result;

/// Vec-backed store for tests, demos and benchmarks.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    feedback: Vec<FeedbackRecord>,
    categories: Vec<ProviderCategory>,
}

impl MemoryStore {
    pub fn new(feedback: Vec<FeedbackRecord>, categories: Vec<ProviderCategory>) -> Self {
        Self {
            feedback,
            categories,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FeedbackStore for MemoryStore {
    async fn load_feedback(&self) -> Result<Vec<FeedbackRecord>> {
        Ok(self.feedback.clone())
    }

    async fn load_provider_categories(&self) -> Result<Vec<ProviderCategory>> {
        Ok(self.categories.clone())
    }
}
