//! Rules deciding when a banner's history advances and when its bindings change.
//!
//! Every `ContentStore` implementation applies these inside its update
//! transaction, so the in-memory and PostgreSQL backends agree.

use crate::banner::{BannerContent, FeatureTag, HistoryEntry};
use crate::error::{CoreError, CoreResult};
use crate::types::{DbId, FeatureId};

/// Version number of the snapshot written when a banner is created.
pub const FIRST_VERSION: i32 = 1;

/// Version to append for `content`, or `None` when it equals the latest snapshot.
pub fn next_version(latest: Option<&HistoryEntry>, content: &BannerContent) -> Option<i32> {
    match latest {
        None => Some(FIRST_VERSION),
        Some(entry) if entry.content != *content => Some(entry.version + 1),
        Some(_) => None,
    }
}

/// A banner's feature is fixed once bound.
pub fn ensure_same_feature(
    banner_id: DbId,
    bound: Option<FeatureId>,
    requested: FeatureId,
) -> CoreResult<()> {
    match bound {
        Some(bound) if bound != requested => Err(CoreError::FeatureMismatch {
            banner_id,
            bound,
            requested,
        }),
        _ => Ok(()),
    }
}

/// `true` when `requested` is not yet among the banner's own bindings.
pub fn needs_binding(existing: &[FeatureTag], requested: FeatureTag) -> bool {
    !existing.contains(&requested)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn entry(version: i32, title: &str) -> HistoryEntry {
        HistoryEntry {
            banner_id: 1,
            version,
            content: BannerContent::new(title, "body", "url"),
        }
    }

    #[test]
    fn first_snapshot_is_version_one() {
        assert_eq!(next_version(None, &BannerContent::default()), Some(1));
    }

    #[test]
    fn unchanged_content_appends_nothing() {
        let latest = entry(3, "A");
        assert_eq!(next_version(Some(&latest), &latest.content.clone()), None);
    }

    #[test]
    fn any_field_change_advances_version() {
        let latest = entry(3, "A");
        let mut changed = latest.content.clone();
        changed.url = "other".into();
        assert_eq!(next_version(Some(&latest), &changed), Some(4));

        let mut changed = latest.content.clone();
        changed.body = "other".into();
        assert_eq!(next_version(Some(&latest), &changed), Some(4));
    }

    #[test]
    fn feature_must_match_bound_feature() {
        assert!(ensure_same_feature(7, Some(1), 1).is_ok());
        assert!(ensure_same_feature(7, None, 5).is_ok());
        assert_matches!(
            ensure_same_feature(7, Some(1), 2),
            Err(CoreError::FeatureMismatch {
                banner_id: 7,
                bound: 1,
                requested: 2
            })
        );
    }

    #[test]
    fn binding_needed_only_for_new_pairs() {
        let existing = [FeatureTag::new(1, 1), FeatureTag::new(1, 2)];
        assert!(!needs_binding(&existing, FeatureTag::new(1, 2)));
        assert!(needs_binding(&existing, FeatureTag::new(1, 3)));
        assert!(needs_binding(&[], FeatureTag::new(1, 1)));
    }
}
