//! Versioning engine.
//!
//! [`BannerEngine`] runs every banner operation against an injected
//! [`ContentStore`] and uses the [`FastPathCache`] opportunistically. Store
//! errors propagate; cache writes and purges are best-effort and only
//! logged.

use std::sync::Arc;

use crate::banner::{Banner, BannerContent, BannerUpdate, FeatureTag, HistoryEntry, NewBanner};
use crate::cache::FastPathCache;
use crate::error::{CoreError, CoreResult};
use crate::query::{Query, ReadPath};
use crate::store::ContentStore;
use crate::types::DbId;

/// How the engine keeps the fast-path cache in step with writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Purge a banner's cache keys after a committed update or version restore.
    /// Deletes always purge.
    pub invalidate_on_write: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            invalidate_on_write: true,
        }
    }
}

/// Orchestrates the content store and the fast-path cache.
///
/// Cheaply cloneable; both backends are behind `Arc`.
#[derive(Clone)]
pub struct BannerEngine {
    store: Arc<dyn ContentStore>,
    cache: Arc<dyn FastPathCache>,
    policy: CachePolicy,
}

impl BannerEngine {
    pub fn new(store: Arc<dyn ContentStore>, cache: Arc<dyn FastPathCache>) -> Self {
        Self {
            store,
            cache,
            policy: CachePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create a banner with its binding and first history version.
    pub async fn create_banner(&self, input: &NewBanner) -> CoreResult<DbId> {
        let banner_id = self.store.create_banner(input).await?;
        tracing::info!(
            banner_id,
            feature_id = input.feature_id,
            tag_id = input.tag_id,
            "Banner created"
        );
        Ok(banner_id)
    }

    /// Update a banner in place. Returns `false` when the banner does not exist.
    pub async fn update_banner(&self, banner_id: DbId, input: &BannerUpdate) -> CoreResult<bool> {
        let Some(bindings) = self.store.update_banner(banner_id, input).await? else {
            tracing::debug!(banner_id, "Update skipped, banner does not exist");
            return Ok(false);
        };
        tracing::info!(banner_id, bindings = bindings.len(), "Banner updated");

        if self.policy.invalidate_on_write {
            self.purge(banner_id, &bindings).await;
        }
        Ok(true)
    }

    /// Strict read. Returns empty content when no active banner is bound to `key`.
    ///
    /// A found banner is written to the cache; the empty sentinel never is.
    pub async fn get_banner(&self, key: FeatureTag) -> CoreResult<BannerContent> {
        let Some(content) = self.store.find_active_content(key).await? else {
            return Ok(BannerContent::default());
        };

        if let Err(err) = self.cache.put(key.cache_key(), &content).await {
            tracing::warn!(
                feature_id = key.feature_id,
                tag_id = key.tag_id,
                error = %err,
                "Cache write failed"
            );
        }
        Ok(content)
    }

    /// Cache-only read. A missing entry is `CoreError::NotFound`.
    pub async fn get_banner_from_cache(&self, key: FeatureTag) -> CoreResult<BannerContent> {
        match self.cache.get(key.cache_key()).await? {
            Some(content) => {
                tracing::debug!(feature_id = key.feature_id, tag_id = key.tag_id, "Cache hit");
                Ok(content)
            }
            None => {
                tracing::debug!(feature_id = key.feature_id, tag_id = key.tag_id, "Cache miss");
                Err(CoreError::cache_miss(key.feature_id, key.tag_id))
            }
        }
    }

    /// Single-banner read driven by a normalized query.
    ///
    /// Queries without both ids are rejected before any backend is touched.
    pub async fn get_user_banner(&self, query: &Query) -> CoreResult<BannerContent> {
        let key = query.single_banner()?;
        match query.read_path() {
            ReadPath::Strict => self.get_banner(key).await,
            ReadPath::Cached => self.get_banner_from_cache(key).await,
        }
    }

    /// Every banner bound to the query's feature OR tag. Not paginated; see
    /// [`Query::paginate`].
    pub async fn get_banners(&self, query: &Query) -> CoreResult<Vec<Banner>> {
        self.store.list_banners(query.feature_id, query.tag_id).await
    }

    /// Delete a banner with its bindings and history, then purge its cache keys.
    pub async fn delete_banner(&self, banner_id: DbId) -> CoreResult<()> {
        let removed = self.store.delete_banner(banner_id).await?;
        tracing::info!(banner_id, bindings = removed.len(), "Banner deleted");
        self.purge(banner_id, &removed).await;
        Ok(())
    }

    /// Full history in ascending version order.
    pub async fn get_history_banner(&self, banner_id: DbId) -> CoreResult<Vec<HistoryEntry>> {
        self.store.list_history(banner_id).await
    }

    /// Make a history entry's content the live content. History is not appended.
    pub async fn update_version(&self, entry: &HistoryEntry) -> CoreResult<()> {
        let bindings = self.store.restore_version(entry).await?;
        if bindings.is_empty() {
            tracing::debug!(banner_id = entry.banner_id, "Restore skipped, banner does not exist");
            return Ok(());
        }
        tracing::info!(
            banner_id = entry.banner_id,
            version = entry.version,
            "Banner version restored"
        );

        if self.policy.invalidate_on_write {
            self.purge(entry.banner_id, &bindings).await;
        }
        Ok(())
    }

    async fn purge(&self, banner_id: DbId, bindings: &[FeatureTag]) {
        if bindings.is_empty() {
            return;
        }
        let keys: Vec<u64> = bindings.iter().map(FeatureTag::cache_key).collect();
        if let Err(err) = self.cache.remove(&keys).await {
            tracing::warn!(banner_id, error = %err, "Cache purge failed");
        }
    }
}
