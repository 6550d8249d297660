use crate::models::FeedbackRecord;
use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use std::collections::HashMap;

/// Sparse user/provider rating pivot, densified for the similarity math.
///
/// Rows are distinct user ids, columns distinct provider ids, both sorted
/// ascending so rebuilding from the same snapshot yields the same layout.
/// A cell of 0.0 means "no rating"; the rating scale itself never contains 0.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    user_ids: Vec<i64>,
    provider_ids: Vec<i64>,
    user_index: HashMap<i64, usize>,
    values: Array2<f32>,
}

impl RatingMatrix {
    /// Pivot raw feedback records into the matrix. When a (user, provider)
    /// pair was rated more than once, the record with the greatest
    /// `created_at` wins; exact timestamp ties resolve to the later record
    /// in input order.
    pub fn from_records(records: &[FeedbackRecord]) -> Self {
        let mut cells: HashMap<(i64, i64), (DateTime<Utc>, f32)> = HashMap::new();
        for record in records {
            let cell = cells
                .entry((record.user_id, record.provider_id))
                .or_insert((record.created_at, record.rating));
            if record.created_at >= cell.0 {
                *cell = (record.created_at, record.rating);
            }
        }

        let mut user_ids: Vec<i64> = cells.keys().map(|(u, _)| *u).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut provider_ids: Vec<i64> = cells.keys().map(|(_, p)| *p).collect();
        provider_ids.sort_unstable();
        provider_ids.dedup();

        let user_index: HashMap<i64, usize> = user_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        let provider_index: HashMap<i64, usize> = provider_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();

        let mut values = Array2::zeros((user_ids.len(), provider_ids.len()));
        for ((user_id, provider_id), (_, rating)) in &cells {
            values[[user_index[user_id], provider_index[provider_id]]] = *rating;
        }

        Self {
            user_ids,
            provider_ids,
            user_index,
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_providers(&self) -> usize {
        self.provider_ids.len()
    }

    pub fn user_ids(&self) -> &[i64] {
        &self.user_ids
    }

    pub fn provider_ids(&self) -> &[i64] {
        &self.provider_ids
    }

    pub fn user_position(&self, user_id: i64) -> Option<usize> {
        self.user_index.get(&user_id).copied()
    }

    pub fn row(&self, position: usize) -> ArrayView1<'_, f32> {
        self.values.row(position)
    }
}

/// Cosine similarity of two rating rows; 0 by convention when either row
/// carries no signal.
pub fn cosine_similarity(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    let dot = a.dot(&b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// All-pairs cosine similarity between the matrix rows. Symmetric, values
/// in [-1, 1]. Rows are independent, so they are computed in parallel.
pub fn user_similarity(matrix: &RatingMatrix) -> Array2<f32> {
    let n = matrix.num_users();

    let rows: Vec<Vec<f32>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let a = matrix.row(i);
            (0..n).map(|j| cosine_similarity(a, matrix.row(j))).collect()
        })
        .collect();

    let mut similarity = Array2::zeros((n, n));
    for (i, row) in rows.into_iter().enumerate() {
        for (j, value) in row.into_iter().enumerate() {
            similarity[[i, j]] = value;
        }
    }

    similarity
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use ndarray::array;

    #[test]
    fn test_empty_matrix() {
        let matrix = RatingMatrix::from_records(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.num_users(), 0);
        assert_eq!(matrix.num_providers(), 0);
    }

    #[test]
    fn test_pivot_layout_is_sorted() {
        let records = vec![
            FeedbackRecord::new(7, 30, 4.0),
            FeedbackRecord::new(1, 10, 5.0),
            FeedbackRecord::new(3, 20, 3.0),
        ];
        let matrix = RatingMatrix::from_records(&records);

        assert_eq!(matrix.user_ids(), &[1, 3, 7]);
        assert_eq!(matrix.provider_ids(), &[10, 20, 30]);
        assert_eq!(matrix.user_position(3), Some(1));
        assert_eq!(matrix.user_position(99), None);

        // Absent cells are 0, present cells carry the rating
        let row = matrix.row(0);
        assert_eq!(row[0], 5.0);
        assert_eq!(row[1], 0.0);
        assert_eq!(row[2], 0.0);
    }

    #[test]
    fn test_duplicate_ratings_keep_most_recent() {
        let earlier = Utc::now() - Duration::hours(2);
        let later = Utc::now();

        // Most recent wins regardless of input order
        let records = vec![
            FeedbackRecord::new(1, 10, 2.0).with_created_at(later),
            FeedbackRecord::new(1, 10, 5.0).with_created_at(earlier),
        ];
        let matrix = RatingMatrix::from_records(&records);
        assert_eq!(matrix.row(0)[0], 2.0);

        // Exact timestamp ties resolve to the later record in input order
        let records = vec![
            FeedbackRecord::new(1, 10, 2.0).with_created_at(later),
            FeedbackRecord::new(1, 10, 4.0).with_created_at(later),
        ];
        let matrix = RatingMatrix::from_records(&records);
        assert_eq!(matrix.row(0)[0], 4.0);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = array![1.0_f32, 0.0, 0.0];
        let b = array![0.0_f32, 1.0, 0.0];
        assert_eq!(cosine_similarity(a.view(), b.view()), 0.0);

        let a = array![1.0_f32, 1.0];
        let b = array![1.0_f32, 1.0];
        assert!((cosine_similarity(a.view(), b.view()) - 1.0).abs() < 1e-6);

        let zero = array![0.0_f32, 0.0];
        let b = array![1.0_f32, 1.0];
        assert_eq!(cosine_similarity(zero.view(), b.view()), 0.0);

        let a = array![1.0_f32, 2.0];
        let b = array![-1.0_f32, -2.0];
        assert!((cosine_similarity(a.view(), b.view()) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_user_similarity_is_symmetric() {
        let records = vec![
            FeedbackRecord::new(1, 10, 5.0),
            FeedbackRecord::new(1, 11, 3.0),
            FeedbackRecord::new(2, 10, 5.0),
            FeedbackRecord::new(2, 12, 4.0),
            FeedbackRecord::new(3, 12, 1.0),
        ];
        let matrix = RatingMatrix::from_records(&records);
        let similarity = user_similarity(&matrix);

        assert_eq!(similarity.dim(), (3, 3));
        for i in 0..3 {
            for j in 0..3 {
                assert!((similarity[[i, j]] - similarity[[j, i]]).abs() < 1e-6);
                assert!(similarity[[i, j]] >= -1.0 - 1e-6);
                assert!(similarity[[i, j]] <= 1.0 + 1e-6);
            }
        }

        // Users 1 and 3 share no rated provider: no shared signal
        assert_eq!(similarity[[0, 2]], 0.0);
        // Users 1 and 2 both rated provider 10 highly
        assert!(similarity[[0, 1]] > 0.5);
    }
}
