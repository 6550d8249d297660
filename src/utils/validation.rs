use crate::config::RankingConfig;
use crate::models::*;
use anyhow::{anyhow, Result};

pub fn validate_feedback_record(record: &FeedbackRecord, config: &RankingConfig) -> Result<()> {
    if record.user_id <= 0 {
        return Err(anyhow!("User ID must be positive, got {}", record.user_id));
    }

    if record.provider_id <= 0 {
        return Err(anyhow!(
            "Provider ID must be positive, got {}",
            record.provider_id
        ));
    }

    if !record.rating.is_finite() {
        return Err(anyhow!("Rating is not a finite number"));
    }

    // The scale never includes 0; 0 is reserved to encode "no rating".
    if record.rating < config.min_rating || record.rating > config.max_rating {
        return Err(anyhow!(
            "Rating {} outside the {}..={} scale",
            record.rating,
            config.min_rating,
            config.max_rating
        ));
    }

    Ok(())
}

pub fn validate_provider_category(assoc: &ProviderCategory) -> Result<()> {
    if assoc.provider_id <= 0 {
        return Err(anyhow!(
            "Provider ID must be positive, got {}",
            assoc.provider_id
        ));
    }

    if assoc.service_category_id <= 0 {
        return Err(anyhow!(
            "Service category ID must be positive, got {}",
            assoc.service_category_id
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_validate_feedback_record() {
        let config = Config::default().ranking;

        assert!(validate_feedback_record(&FeedbackRecord::new(1, 10, 5.0), &config).is_ok());
        assert!(validate_feedback_record(&FeedbackRecord::new(1, 10, 1.0), &config).is_ok());

        // 0 encodes absence and is never a valid rating
        assert!(validate_feedback_record(&FeedbackRecord::new(1, 10, 0.0), &config).is_err());
        assert!(validate_feedback_record(&FeedbackRecord::new(1, 10, 6.0), &config).is_err());
        assert!(validate_feedback_record(&FeedbackRecord::new(1, 10, f32::NAN), &config).is_err());
        assert!(validate_feedback_record(&FeedbackRecord::new(0, 10, 3.0), &config).is_err());
        assert!(validate_feedback_record(&FeedbackRecord::new(1, -2, 3.0), &config).is_err());
    }

    #[test]
    fn test_validate_provider_category() {
        assert!(validate_provider_category(&ProviderCategory::new(10, 2)).is_ok());
        assert!(validate_provider_category(&ProviderCategory::new(0, 2)).is_err());
        assert!(validate_provider_category(&ProviderCategory::new(10, 0)).is_err());
    }
}
