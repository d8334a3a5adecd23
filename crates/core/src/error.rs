use crate::types::{DbId, FeatureId, TagId};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {entity} {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Binding conflict: feature {feature_id} / tag {tag_id} is already bound to another banner")]
    BindingConflict { feature_id: FeatureId, tag_id: TagId },

    #[error("Feature mismatch: banner {banner_id} is bound to feature {bound}, got {requested}")]
    FeatureMismatch {
        banner_id: DbId,
        bound: FeatureId,
        requested: FeatureId,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Cache failure: {0}")]
    Cache(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Cache miss for the given feature/tag pair.
    pub fn cache_miss(feature_id: FeatureId, tag_id: TagId) -> Self {
        CoreError::NotFound {
            entity: "cache entry",
            key: format!("feature={feature_id} tag={tag_id}"),
        }
    }

    /// Returns `true` for the `NotFound` variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_miss_is_not_found() {
        let err = CoreError::cache_miss(3, 9);
        assert!(err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("feature=3"));
        assert!(msg.contains("tag=9"));
    }

    #[test]
    fn feature_mismatch_message_names_both_features() {
        let err = CoreError::FeatureMismatch {
            banner_id: 7,
            bound: 1,
            requested: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("banner 7"));
        assert!(msg.contains("feature 1"));
        assert!(msg.contains("got 2"));
        assert!(!err.is_not_found());
    }
}
