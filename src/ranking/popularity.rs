use super::RankingError;
use crate::models::*;
use crate::utils::round2;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Category leaderboard with per-provider rating summaries.
///
/// Groups the feedback snapshot by provider, takes the arithmetic mean over
/// every rating event (providers without feedback have no mean and are
/// excluded), restricts to the requested category and returns the `top_n`
/// best. Ordering: mean descending, then rating count descending, then
/// provider id ascending. Sorting uses the exact mean; the reported
/// `mean_rating` is rounded to two decimals for display.
pub fn top_rated_summaries(
    feedback: &[FeedbackRecord],
    categories: &[ProviderCategory],
    service_category_id: i64,
    top_n: usize,
) -> Result<Vec<ProviderRating>, RankingError> {
    if top_n == 0 {
        return Err(RankingError::InvalidTopN(top_n));
    }

    let in_category: HashSet<i64> = categories
        .iter()
        .filter(|assoc| assoc.service_category_id == service_category_id)
        .map(|assoc| assoc.provider_id)
        .collect();
    if in_category.is_empty() {
        return Ok(Vec::new());
    }

    let mut totals: HashMap<i64, (f64, u64)> = HashMap::new();
    for record in feedback {
        if !in_category.contains(&record.provider_id) {
            continue;
        }
        let entry = totals.entry(record.provider_id).or_insert((0.0, 0));
        entry.0 += f64::from(record.rating);
        entry.1 += 1;
    }

    let mut ranked: Vec<(i64, f64, u64)> = totals
        .into_iter()
        .map(|(provider_id, (sum, count))| (provider_id, sum / count as f64, count))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(top_n);

    Ok(ranked
        .into_iter()
        .map(|(provider_id, mean, count)| ProviderRating {
            provider_id,
            mean_rating: round2(mean as f32),
            rating_count: count,
        })
        .collect())
}

/// Same leaderboard, provider ids only. This is the shape the
/// recommendation fallback consumes.
pub fn top_rated(
    feedback: &[FeedbackRecord],
    categories: &[ProviderCategory],
    service_category_id: i64,
    top_n: usize,
) -> Result<Vec<i64>, RankingError> {
    Ok(
        top_rated_summaries(feedback, categories, service_category_id, top_n)?
            .into_iter()
            .map(|summary| summary.provider_id)
            .collect(),
    )
}
