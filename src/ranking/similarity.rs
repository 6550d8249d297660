use super::matrix::{user_similarity, RatingMatrix};
use super::{RankingError, Recommendations};
use crate::models::*;
use ndarray::Array1;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Collaborative-filtering ranking of providers within one service category
/// for one user.
///
/// Builds the rating pivot from the full feedback snapshot, weights every
/// other user's rating row by their cosine similarity to the requesting
/// user, drops providers the user already rated, restricts to the requested
/// category and returns the `top_n` highest-scoring provider ids.
///
/// All "no input data" situations (empty snapshot, unknown user, no
/// candidates left after filtering) come back as [`Recommendations::NoData`]
/// so the caller can fall back to the category leaderboard. Only a
/// malformed `top_n` is an error.
pub fn rank(
    feedback: &[FeedbackRecord],
    categories: &[ProviderCategory],
    user_id: i64,
    service_category_id: i64,
    top_n: usize,
) -> Result<Recommendations, RankingError> {
    if top_n == 0 {
        return Err(RankingError::InvalidTopN(top_n));
    }

    let matrix = RatingMatrix::from_records(feedback);
    if matrix.is_empty() {
        return Ok(Recommendations::NoData);
    }

    let Some(user_pos) = matrix.user_position(user_id) else {
        return Ok(Recommendations::NoData);
    };

    let similarity = user_similarity(&matrix);

    // Every other user, most similar first, ties by ascending user id. The
    // self entry never contributes.
    let mut neighbors: Vec<(usize, f32)> = (0..matrix.num_users())
        .filter(|&pos| pos != user_pos)
        .map(|pos| (pos, similarity[[user_pos, pos]]))
        .collect();
    neighbors.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| matrix.user_ids()[a.0].cmp(&matrix.user_ids()[b.0]))
    });

    // Accumulate similarity-weighted rating rows. All neighbors contribute
    // regardless of sign, so a negative similarity subtracts from a
    // provider's score.
    let mut weighted = Array1::<f32>::zeros(matrix.num_providers());
    for &(pos, score) in &neighbors {
        weighted.scaled_add(score, &matrix.row(pos));
    }

    let in_category: HashSet<i64> = categories
        .iter()
        .filter(|assoc| assoc.service_category_id == service_category_id)
        .map(|assoc| assoc.provider_id)
        .collect();

    // Keep providers in the requested category that the requesting user has
    // not rated yet.
    let own_row = matrix.row(user_pos);
    let mut candidates: Vec<(i64, f32)> = matrix
        .provider_ids()
        .iter()
        .enumerate()
        .filter(|(col, provider_id)| own_row[*col] <= 0.0 && in_category.contains(provider_id))
        .map(|(col, provider_id)| (*provider_id, weighted[col]))
        .collect();

    candidates.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    candidates.truncate(top_n);

    if candidates.is_empty() {
        Ok(Recommendations::NoData)
    } else {
        Ok(Recommendations::Ranked(
            candidates.into_iter().map(|(id, _)| id).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_similar_users() -> (Vec<FeedbackRecord>, Vec<ProviderCategory>) {
        // User 1 rated providers 10 and 11; user 2 shares the opinion on 10
        // and additionally rated 12, which sits in category 2.
        let feedback = vec![
            FeedbackRecord::new(1, 10, 5.0),
            FeedbackRecord::new(1, 11, 3.0),
            FeedbackRecord::new(2, 10, 5.0),
            FeedbackRecord::new(2, 12, 4.0),
        ];
        let categories = vec![
            ProviderCategory::new(10, 2),
            ProviderCategory::new(11, 2),
            ProviderCategory::new(12, 2),
        ];
        (feedback, categories)
    }

    #[test]
    fn test_zero_top_n_is_rejected() {
        let (feedback, categories) = two_similar_users();
        let result = rank(&feedback, &categories, 1, 2, 0);
        assert!(matches!(result, Err(RankingError::InvalidTopN(0))));
    }

    #[test]
    fn test_empty_snapshot_returns_no_data() {
        assert_eq!(rank(&[], &[], 1, 2, 5).unwrap(), Recommendations::NoData);
    }

    #[test]
    fn test_unknown_user_returns_no_data() {
        let (feedback, categories) = two_similar_users();
        assert_eq!(
            rank(&feedback, &categories, 99, 2, 5).unwrap(),
            Recommendations::NoData
        );
    }

    #[test]
    fn test_unknown_category_returns_no_data() {
        let (feedback, categories) = two_similar_users();
        assert_eq!(
            rank(&feedback, &categories, 1, 77, 5).unwrap(),
            Recommendations::NoData
        );
    }

    #[test]
    fn test_recommends_unrated_provider_from_similar_user() {
        let (feedback, categories) = two_similar_users();
        let ranked = rank(&feedback, &categories, 1, 2, 5).unwrap();

        // Provider 12 is unrated by user 1 and positively weighted by the
        // similar user 2; providers 10 and 11 are already rated by user 1.
        assert_eq!(ranked, Recommendations::Ranked(vec![12]));
    }

    #[test]
    fn test_never_recommends_already_rated_provider() {
        let (feedback, categories) = two_similar_users();
        if let Recommendations::Ranked(ids) = rank(&feedback, &categories, 1, 2, 5).unwrap() {
            assert!(!ids.contains(&10));
            assert!(!ids.contains(&11));
        } else {
            panic!("expected a ranked result");
        }
    }

    #[test]
    fn test_category_filter_is_strict() {
        let feedback = vec![
            FeedbackRecord::new(1, 10, 5.0),
            FeedbackRecord::new(2, 10, 5.0),
            FeedbackRecord::new(2, 12, 4.0),
            FeedbackRecord::new(2, 13, 5.0),
        ];
        // Provider 13 scores higher but belongs to another category
        let categories = vec![
            ProviderCategory::new(10, 2),
            ProviderCategory::new(12, 2),
            ProviderCategory::new(13, 3),
        ];

        let ranked = rank(&feedback, &categories, 1, 2, 5).unwrap();
        assert_eq!(ranked, Recommendations::Ranked(vec![12]));
    }

    #[test]
    fn test_top_n_caps_the_result() {
        let mut feedback = vec![FeedbackRecord::new(1, 100, 5.0)];
        let mut categories = vec![ProviderCategory::new(100, 2)];
        for provider_id in 10..20 {
            feedback.push(FeedbackRecord::new(2, provider_id, 4.0));
            categories.push(ProviderCategory::new(provider_id, 2));
        }
        feedback.push(FeedbackRecord::new(2, 100, 5.0));

        let Recommendations::Ranked(ids) = rank(&feedback, &categories, 1, 2, 3).unwrap() else {
            panic!("expected a ranked result");
        };
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_score_ties_break_by_ascending_provider_id() {
        // Both candidates get the same weighted score from user 2
        let feedback = vec![
            FeedbackRecord::new(1, 10, 5.0),
            FeedbackRecord::new(2, 10, 5.0),
            FeedbackRecord::new(2, 31, 4.0),
            FeedbackRecord::new(2, 30, 4.0),
        ];
        let categories = vec![
            ProviderCategory::new(30, 2),
            ProviderCategory::new(31, 2),
        ];

        let ranked = rank(&feedback, &categories, 1, 2, 5).unwrap();
        assert_eq!(ranked, Recommendations::Ranked(vec![30, 31]));
    }

    #[test]
    fn test_similarity_weighting_dominates_raw_rating() {
        // User 2 agrees with user 1 on provider 10 and recommends 12 with a
        // modest rating. User 3 shares nothing with user 1 (similarity 0)
        // and loves provider 13. The dissimilar user's enthusiasm must not
        // outrank the similar user's suggestion.
        let feedback = vec![
            FeedbackRecord::new(1, 10, 5.0),
            FeedbackRecord::new(2, 10, 5.0),
            FeedbackRecord::new(2, 12, 3.0),
            FeedbackRecord::new(3, 11, 5.0),
            FeedbackRecord::new(3, 13, 5.0),
        ];
        let categories = vec![
            ProviderCategory::new(12, 2),
            ProviderCategory::new(13, 2),
        ];

        let ranked = rank(&feedback, &categories, 1, 2, 5).unwrap();
        assert_eq!(ranked, Recommendations::Ranked(vec![12, 13]));
    }

    #[test]
    fn test_idempotent_over_unchanged_snapshot() {
        let (feedback, categories) = two_similar_users();
        let first = rank(&feedback, &categories, 1, 2, 5).unwrap();
        let second = rank(&feedback, &categories, 1, 2, 5).unwrap();
        assert_eq!(first, second);
    }
}
