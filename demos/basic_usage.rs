use handyrec::store::MemoryStore;
use handyrec::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().await;

    println!("🚀 HandyRec provider ranking walk-through");

    // 1. A small marketplace snapshot: category 2 is plumbing, category 3
    //    electrical work.
    let feedback = vec![
        FeedbackRecord::new(1, 10, 5.0),
        FeedbackRecord::new(1, 11, 3.0),
        FeedbackRecord::new(2, 10, 5.0),
        FeedbackRecord::new(2, 12, 4.0),
        FeedbackRecord::new(3, 20, 5.0),
        FeedbackRecord::new(4, 20, 4.0),
        FeedbackRecord::new(4, 21, 4.5),
    ];
    let categories = vec![
        ProviderCategory::new(10, 2),
        ProviderCategory::new(11, 2),
        ProviderCategory::new(12, 2),
        ProviderCategory::new(20, 3),
        ProviderCategory::new(21, 3),
    ];
    println!(
        "✅ Snapshot loaded: {} feedback records, {} providers",
        feedback.len(),
        categories.len()
    );

    let store = Arc::new(MemoryStore::new(feedback, categories));
    let config = Arc::new(Config::default());
    let redis_client = Arc::new(redis::Client::open(config.redis.url.as_str())?);
    let service = RankingService::new(store, redis_client, config);

    // 2. Personalized ranking: user 1 looks for a plumber. User 2 shares
    //    their taste and has rated provider 12, which user 1 hasn't tried.
    match service.rank(1, 2, None).await? {
        Recommendations::Ranked(ids) => {
            println!("🎯 Personalized plumbers for user 1: {:?}", ids);
        }
        Recommendations::NoData => println!("🎯 No personalized result for user 1"),
    }

    // 3. A brand-new user gets the category leaderboard instead.
    let recommended = service.recommend(99, 3, None).await?;
    println!("🏆 Electricians for first-time user 99: {:?}", recommended);

    // 4. The featured-providers strip wants the richer summary shape.
    let summaries = service.top_rated_summaries(3, None).await?;
    for summary in &summaries {
        println!(
            "   ⭐ provider {} | mean {:.2} from {} ratings",
            summary.provider_id, summary.mean_rating, summary.rating_count
        );
    }

    println!("🎉 Done");
    Ok(())
}
