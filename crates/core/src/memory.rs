//! In-memory backends.
//!
//! [`MemoryContentStore`] and [`MemoryCache`] satisfy the same contracts as
//! the PostgreSQL and Redis backends and are what the engine tests run
//! against. Each store operation works on a copy of the tables and swaps it
//! in only on success, which gives the same all-or-nothing behaviour as a
//! database transaction. [`FailPoint`]s let tests abort an operation midway.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::banner::{Banner, BannerContent, BannerUpdate, FeatureTag, HistoryEntry, NewBanner};
use crate::cache::FastPathCache;
use crate::error::{CoreError, CoreResult};
use crate::store::ContentStore;
use crate::types::{DbId, FeatureId, TagId, Timestamp};
use crate::versioning::{ensure_same_feature, needs_binding, next_version, FIRST_VERSION};

// ---------------------------------------------------------------------------
// MemoryContentStore
// ---------------------------------------------------------------------------

/// Step at which an injected storage failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    BannerWrite,
    BindingInsert,
    HistoryInsert,
    BindingDelete,
    HistoryDelete,
}

/// Row counts across the three relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCounts {
    pub banners: usize,
    pub bindings: usize,
    pub history: usize,
}

#[derive(Debug, Clone)]
struct BannerRow {
    content: BannerContent,
    is_active: bool,
    created_at: Timestamp,
    updated_at: Timestamp,
}

#[derive(Debug, Clone)]
struct Tables {
    next_id: DbId,
    banners: BTreeMap<DbId, BannerRow>,
    bindings: BTreeMap<FeatureTag, DbId>,
    history: BTreeMap<(DbId, i32), BannerContent>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            next_id: 1,
            banners: BTreeMap::new(),
            bindings: BTreeMap::new(),
            history: BTreeMap::new(),
        }
    }
}

impl Tables {
    fn bindings_of(&self, banner_id: DbId) -> Vec<FeatureTag> {
        self.bindings
            .iter()
            .filter(|(_, id)| **id == banner_id)
            .map(|(key, _)| *key)
            .collect()
    }

    fn history_of(&self, banner_id: DbId) -> impl DoubleEndedIterator<Item = HistoryEntry> + '_ {
        self.history
            .range((banner_id, i32::MIN)..=(banner_id, i32::MAX))
            .map(|((banner_id, version), content)| HistoryEntry {
                banner_id: *banner_id,
                version: *version,
                content: content.clone(),
            })
    }
}

#[derive(Debug, Default)]
struct State {
    tables: Tables,
    fail_at: Option<FailPoint>,
}

impl State {
    fn trip(&mut self, point: FailPoint) -> CoreResult<()> {
        if self.fail_at == Some(point) {
            self.fail_at = None;
            return Err(CoreError::Storage(format!("injected failure at {point:?}")));
        }
        Ok(())
    }
}

/// `ContentStore` backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    state: Mutex<State>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next operation that reaches `point` fail and roll back.
    pub async fn inject_failure(&self, point: FailPoint) {
        self.state.lock().await.fail_at = Some(point);
    }

    pub async fn row_counts(&self) -> RowCounts {
        let state = self.state.lock().await;
        RowCounts {
            banners: state.tables.banners.len(),
            bindings: state.tables.bindings.len(),
            history: state.tables.history.len(),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn create_banner(&self, input: &NewBanner) -> CoreResult<DbId> {
        let mut state = self.state.lock().await;
        let mut tx = state.tables.clone();

        state.trip(FailPoint::BannerWrite)?;
        let id = tx.next_id;
        tx.next_id += 1;
        let now = Utc::now();
        tx.banners.insert(
            id,
            BannerRow {
                content: input.content.clone(),
                is_active: input.is_active,
                created_at: now,
                updated_at: now,
            },
        );

        let key = input.binding();
        if tx.bindings.contains_key(&key) {
            return Err(CoreError::BindingConflict {
                feature_id: key.feature_id,
                tag_id: key.tag_id,
            });
        }
        state.trip(FailPoint::BindingInsert)?;
        tx.bindings.insert(key, id);

        state.trip(FailPoint::HistoryInsert)?;
        tx.history.insert((id, FIRST_VERSION), input.content.clone());

        state.tables = tx;
        Ok(id)
    }

    async fn update_banner(
        &self,
        banner_id: DbId,
        input: &BannerUpdate,
    ) -> CoreResult<Option<Vec<FeatureTag>>> {
        let mut state = self.state.lock().await;
        let mut tx = state.tables.clone();

        state.trip(FailPoint::BannerWrite)?;
        let Some(row) = tx.banners.get_mut(&banner_id) else {
            return Ok(None);
        };
        row.content = input.content.clone();
        row.is_active = input.is_active;
        row.updated_at = Utc::now();

        let mut bindings = tx.bindings_of(banner_id);
        ensure_same_feature(
            banner_id,
            bindings.first().map(|b| b.feature_id),
            input.feature_id,
        )?;

        let key = input.binding();
        if needs_binding(&bindings, key) {
            if tx.bindings.contains_key(&key) {
                return Err(CoreError::BindingConflict {
                    feature_id: key.feature_id,
                    tag_id: key.tag_id,
                });
            }
            state.trip(FailPoint::BindingInsert)?;
            tx.bindings.insert(key, banner_id);
            bindings.push(key);
        }

        let latest = tx.history_of(banner_id).next_back();
        if let Some(version) = next_version(latest.as_ref(), &input.content) {
            state.trip(FailPoint::HistoryInsert)?;
            tx.history.insert((banner_id, version), input.content.clone());
        }

        state.tables = tx;
        Ok(Some(bindings))
    }

    async fn find_active_content(&self, key: FeatureTag) -> CoreResult<Option<BannerContent>> {
        let state = self.state.lock().await;
        let tables = &state.tables;
        Ok(tables
            .bindings
            .get(&key)
            .and_then(|id| tables.banners.get(id))
            .filter(|row| row.is_active)
            .map(|row| row.content.clone()))
    }

    async fn list_banners(&self, feature_id: FeatureId, tag_id: TagId) -> CoreResult<Vec<Banner>> {
        let state = self.state.lock().await;
        let tables = &state.tables;

        let banners = tables
            .banners
            .iter()
            .filter_map(|(id, row)| {
                let bindings = tables.bindings_of(*id);
                let matched = bindings
                    .iter()
                    .any(|b| b.feature_id == feature_id || b.tag_id == tag_id);
                if !matched {
                    return None;
                }
                let mut tag_ids: Vec<TagId> = bindings.iter().map(|b| b.tag_id).collect();
                tag_ids.sort_unstable();
                Some(Banner {
                    id: *id,
                    feature_id: bindings[0].feature_id,
                    tag_ids,
                    content: row.content.clone(),
                    is_active: row.is_active,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                })
            })
            .collect();
        Ok(banners)
    }

    async fn delete_banner(&self, banner_id: DbId) -> CoreResult<Vec<FeatureTag>> {
        let mut state = self.state.lock().await;
        let mut tx = state.tables.clone();

        let removed = tx.bindings_of(banner_id);
        state.trip(FailPoint::BindingDelete)?;
        tx.bindings.retain(|_, id| *id != banner_id);

        state.trip(FailPoint::HistoryDelete)?;
        tx.history.retain(|(id, _), _| *id != banner_id);

        tx.banners.remove(&banner_id);

        state.tables = tx;
        Ok(removed)
    }

    async fn list_history(&self, banner_id: DbId) -> CoreResult<Vec<HistoryEntry>> {
        let state = self.state.lock().await;
        Ok(state.tables.history_of(banner_id).collect())
    }

    async fn restore_version(&self, entry: &HistoryEntry) -> CoreResult<Vec<FeatureTag>> {
        let mut state = self.state.lock().await;
        let tables = &mut state.tables;
        match tables.banners.get_mut(&entry.banner_id) {
            Some(row) => {
                row.content = entry.content.clone();
                row.updated_at = Utc::now();
                Ok(tables.bindings_of(entry.banner_id))
            }
            None => Ok(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryCache
// ---------------------------------------------------------------------------

/// `FastPathCache` backed by a `HashMap`. Can be switched "unavailable" to
/// exercise the cache failure paths.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<u64, BannerContent>>,
    unavailable: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn contains(&self, key: u64) -> bool {
        self.entries.read().await.contains_key(&key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> CoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CoreError::Cache("memory cache marked unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FastPathCache for MemoryCache {
    async fn get(&self, key: u64) -> CoreResult<Option<BannerContent>> {
        self.check_available()?;
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn put(&self, key: u64, content: &BannerContent) -> CoreResult<()> {
        self.check_available()?;
        self.entries.write().await.insert(key, content.clone());
        Ok(())
    }

    async fn remove(&self, keys: &[u64]) -> CoreResult<()> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn new_banner(feature_id: FeatureId, tag_id: TagId, title: &str) -> NewBanner {
        NewBanner {
            feature_id,
            tag_id,
            content: BannerContent::new(title, "body", "https://example.com"),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially() {
        let store = MemoryContentStore::new();
        let a = store.create_banner(&new_banner(1, 1, "A")).await.unwrap();
        let b = store.create_banner(&new_banner(1, 2, "B")).await.unwrap();
        assert_eq!((a, b), (1, 2));
    }

    #[tokio::test]
    async fn failed_create_leaves_no_rows() {
        let store = MemoryContentStore::new();
        for point in [
            FailPoint::BannerWrite,
            FailPoint::BindingInsert,
            FailPoint::HistoryInsert,
        ] {
            store.inject_failure(point).await;
            assert_matches!(
                store.create_banner(&new_banner(1, 1, "A")).await,
                Err(CoreError::Storage(_))
            );
            assert_eq!(
                store.row_counts().await,
                RowCounts {
                    banners: 0,
                    bindings: 0,
                    history: 0
                }
            );
        }
    }

    #[tokio::test]
    async fn injected_failure_fires_once() {
        let store = MemoryContentStore::new();
        store.inject_failure(FailPoint::HistoryInsert).await;
        assert!(store.create_banner(&new_banner(1, 1, "A")).await.is_err());
        assert!(store.create_banner(&new_banner(1, 1, "A")).await.is_ok());
    }

    #[tokio::test]
    async fn restore_on_missing_banner_is_noop() {
        let store = MemoryContentStore::new();
        let entry = HistoryEntry {
            banner_id: 42,
            version: 1,
            content: BannerContent::new("A", "b", "c"),
        };
        assert!(store.restore_version(&entry).await.unwrap().is_empty());
        assert_eq!(store.row_counts().await.banners, 0);
    }

    #[tokio::test]
    async fn cache_round_trip_and_purge() {
        let cache = MemoryCache::new();
        let content = BannerContent::new("A", "b", "c");
        cache.put(10, &content).await.unwrap();
        assert_eq!(cache.get(10).await.unwrap(), Some(content));
        assert_eq!(cache.get(11).await.unwrap(), None);

        cache.remove(&[10, 11]).await.unwrap();
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn unavailable_cache_reports_cache_failure() {
        let cache = MemoryCache::new();
        cache.set_unavailable(true);
        assert_matches!(cache.get(1).await, Err(CoreError::Cache(_)));
        assert_matches!(
            cache.put(1, &BannerContent::default()).await,
            Err(CoreError::Cache(_))
        );
    }
}
