pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::*;
use anyhow::Result;

/// Read-only access to the marketplace's feedback and provider data.
///
/// The ranking core never writes; all mutation of feedback happens in the
/// booking feature. Injecting this seam at construction keeps the service
/// testable against an in-memory fake.
#[async_trait::async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn load_feedback(&self) -> Result<Vec<FeedbackRecord>>;
    async fn load_provider_categories(&self) -> Result<Vec<ProviderCategory>>;
}
