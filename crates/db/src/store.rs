//! Transactional `ContentStore` over PostgreSQL.
//!
//! Every mutating operation opens one transaction and commits it only after
//! all of its steps succeed. An early return or `?` drops the transaction,
//! which rolls it back.

use async_trait::async_trait;
use banner_core::banner::{Banner, BannerContent, BannerUpdate, FeatureTag, HistoryEntry, NewBanner};
use banner_core::error::{CoreError, CoreResult};
use banner_core::store::ContentStore;
use banner_core::types::{DbId, FeatureId, TagId};
use banner_core::versioning::{ensure_same_feature, needs_binding, next_version, FIRST_VERSION};
use sqlx::{PgConnection, PgPool};

use crate::error::{is_unique_violation, DbError, BINDING_CONSTRAINT};
use crate::repositories::{BannerBindingRepo, BannerHistoryRepo, BannerRepo};

#[derive(Debug, Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn create(&self, input: &NewBanner) -> Result<DbId, DbError> {
        let mut tx = self.pool.begin().await?;

        let banner_id = BannerRepo::insert(&mut *tx, &input.content, input.is_active).await?;
        bind(&mut *tx, banner_id, input.binding()).await?;
        BannerHistoryRepo::insert(&mut *tx, banner_id, FIRST_VERSION, &input.content).await?;

        tx.commit().await?;
        Ok(banner_id)
    }

    async fn update(
        &self,
        banner_id: DbId,
        input: &BannerUpdate,
    ) -> Result<Option<Vec<FeatureTag>>, DbError> {
        let mut tx = self.pool.begin().await?;

        if !BannerRepo::update_state(&mut *tx, banner_id, &input.content, input.is_active).await? {
            return Ok(None);
        }

        let mut bindings = BannerBindingRepo::list_for_banner(&mut *tx, banner_id).await?;
        ensure_same_feature(
            banner_id,
            bindings.first().map(|b| b.feature_id),
            input.feature_id,
        )?;

        let key = input.binding();
        if needs_binding(&bindings, key) {
            bind(&mut *tx, banner_id, key).await?;
            bindings.push(key);
        }

        let latest = BannerHistoryRepo::latest(&mut *tx, banner_id).await?;
        if let Some(version) = next_version(latest.as_ref(), &input.content) {
            BannerHistoryRepo::insert(&mut *tx, banner_id, version, &input.content).await?;
        }

        tx.commit().await?;
        Ok(Some(bindings))
    }

    async fn delete(&self, banner_id: DbId) -> Result<Vec<FeatureTag>, DbError> {
        let mut tx = self.pool.begin().await?;

        let removed = BannerBindingRepo::delete_for_banner(&mut *tx, banner_id).await?;
        BannerHistoryRepo::delete_for_banner(&mut *tx, banner_id).await?;
        BannerRepo::delete(&mut *tx, banner_id).await?;

        tx.commit().await?;
        Ok(removed)
    }

    async fn restore(&self, entry: &HistoryEntry) -> Result<Vec<FeatureTag>, DbError> {
        let mut tx = self.pool.begin().await?;

        if !BannerRepo::update_content(&mut *tx, entry.banner_id, &entry.content).await? {
            return Ok(Vec::new());
        }
        let bindings = BannerBindingRepo::list_for_banner(&mut *tx, entry.banner_id).await?;

        tx.commit().await?;
        Ok(bindings)
    }
}

/// Insert a binding, translating a violated pair constraint into `BindingConflict`.
async fn bind(conn: &mut PgConnection, banner_id: DbId, key: FeatureTag) -> Result<(), DbError> {
    BannerBindingRepo::insert(conn, banner_id, key)
        .await
        .map_err(|err| {
            if is_unique_violation(&err, BINDING_CONSTRAINT) {
                tracing::debug!(
                    banner_id,
                    feature_id = key.feature_id,
                    tag_id = key.tag_id,
                    "Binding rejected by unique constraint"
                );
                DbError::Core(CoreError::BindingConflict {
                    feature_id: key.feature_id,
                    tag_id: key.tag_id,
                })
            } else {
                DbError::Sqlx(err)
            }
        })
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn create_banner(&self, input: &NewBanner) -> CoreResult<DbId> {
        Ok(self.create(input).await?)
    }

    async fn update_banner(
        &self,
        banner_id: DbId,
        input: &BannerUpdate,
    ) -> CoreResult<Option<Vec<FeatureTag>>> {
        Ok(self.update(banner_id, input).await?)
    }

    async fn find_active_content(&self, key: FeatureTag) -> CoreResult<Option<BannerContent>> {
        let row = BannerRepo::find_active_content(&self.pool, key)
            .await
            .map_err(DbError::from)?;
        Ok(row.map(BannerContent::from))
    }

    async fn list_banners(&self, feature_id: FeatureId, tag_id: TagId) -> CoreResult<Vec<Banner>> {
        let rows = BannerRepo::list_by_feature_or_tag(&self.pool, feature_id, tag_id)
            .await
            .map_err(DbError::from)?;
        Ok(rows.into_iter().map(Banner::from).collect())
    }

    async fn delete_banner(&self, banner_id: DbId) -> CoreResult<Vec<FeatureTag>> {
        Ok(self.delete(banner_id).await?)
    }

    async fn list_history(&self, banner_id: DbId) -> CoreResult<Vec<HistoryEntry>> {
        Ok(BannerHistoryRepo::list_by_banner(&self.pool, banner_id)
            .await
            .map_err(DbError::from)?)
    }

    async fn restore_version(&self, entry: &HistoryEntry) -> CoreResult<Vec<FeatureTag>> {
        Ok(self.restore(entry).await?)
    }
}
