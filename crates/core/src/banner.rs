//! Banner, binding and history types.
//!
//! These are backend-neutral; the `banner-db` crate maps its rows into them.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, FeatureId, TagId, Timestamp};

/// The versioned payload of a banner.
///
/// Two contents are the same version exactly when all three fields are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerContent {
    pub title: String,
    #[serde(alias = "text")]
    pub body: String,
    pub url: String,
}

impl BannerContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url: url.into(),
        }
    }

    /// The "no active banner" sentinel returned by strict reads.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body.is_empty() && self.url.is_empty()
    }
}

/// A `(feature_id, tag_id)` pair. At most one banner may be bound to each pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureTag {
    pub feature_id: FeatureId,
    pub tag_id: TagId,
}

impl FeatureTag {
    pub fn new(feature_id: FeatureId, tag_id: TagId) -> Self {
        Self { feature_id, tag_id }
    }

    /// 64-bit key of this pair in the fast-path cache.
    pub fn cache_key(&self) -> u64 {
        crate::cache::cache_key(*self)
    }
}

/// Input for creating a banner.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBanner {
    pub feature_id: FeatureId,
    pub tag_id: TagId,
    pub content: BannerContent,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewBanner {
    pub fn binding(&self) -> FeatureTag {
        FeatureTag::new(self.feature_id, self.tag_id)
    }
}

/// Input for updating a banner in place.
///
/// `feature_id` must match the banner's existing feature; `tag_id` is added
/// as a new binding when the banner does not already carry it.
#[derive(Debug, Clone, Deserialize)]
pub struct BannerUpdate {
    pub feature_id: FeatureId,
    pub tag_id: TagId,
    pub content: BannerContent,
    pub is_active: bool,
}

impl BannerUpdate {
    pub fn binding(&self) -> FeatureTag {
        FeatureTag::new(self.feature_id, self.tag_id)
    }
}

fn default_active() -> bool {
    true
}

/// Listing view of a banner with all of its bindings folded in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub id: DbId,
    pub feature_id: FeatureId,
    pub tag_ids: Vec<TagId>,
    pub content: BannerContent,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An immutable snapshot of a banner's content.
///
/// Serialized flat (`banner_id`, `version`, `title`, `body`, `url`) so a
/// history listing can be posted back verbatim to restore a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub banner_id: DbId,
    pub version: i32,
    #[serde(flatten)]
    pub content: BannerContent,
}
