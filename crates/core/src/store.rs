//! Content store capability.
//!
//! The durable source of truth for banners, their bindings and their
//! history. Each mutating method is one storage transaction: it either
//! commits every row it touches or none of them.

use async_trait::async_trait;

use crate::banner::{Banner, BannerContent, BannerUpdate, FeatureTag, HistoryEntry, NewBanner};
use crate::error::CoreResult;
use crate::types::{DbId, FeatureId, TagId};

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert the banner, its binding and history version 1.
    ///
    /// Fails with `BindingConflict` when the pair is already bound.
    async fn create_banner(&self, input: &NewBanner) -> CoreResult<DbId>;

    /// Apply an update. Returns `None` when the banner does not exist,
    /// otherwise every binding the banner holds after the update.
    async fn update_banner(
        &self,
        banner_id: DbId,
        input: &BannerUpdate,
    ) -> CoreResult<Option<Vec<FeatureTag>>>;

    /// Content of the active banner bound to `key`, if any.
    async fn find_active_content(&self, key: FeatureTag) -> CoreResult<Option<BannerContent>>;

    /// Banners with a binding on `feature_id` OR `tag_id`, ordered by id.
    async fn list_banners(&self, feature_id: FeatureId, tag_id: TagId) -> CoreResult<Vec<Banner>>;

    /// Remove the banner with its bindings and history. Returns the removed bindings.
    async fn delete_banner(&self, banner_id: DbId) -> CoreResult<Vec<FeatureTag>>;

    /// History entries in ascending version order.
    async fn list_history(&self, banner_id: DbId) -> CoreResult<Vec<HistoryEntry>>;

    /// Overwrite the live content from a history entry without touching history.
    ///
    /// Returns the banner's bindings, empty when the banner does not exist.
    async fn restore_version(&self, entry: &HistoryEntry) -> CoreResult<Vec<FeatureTag>>;
}
