//! Repository for the `banners` table.

use banner_core::banner::{BannerContent, FeatureTag};
use banner_core::types::{DbId, FeatureId, TagId};
use sqlx::{PgConnection, PgPool};

use crate::models::banner::{BannerListRow, ContentRow};

/// Provides insert, state update, strict lookup, listing and delete operations for banners.
pub struct BannerRepo;

impl BannerRepo {
    /// Insert a banner row and return its new id.
    pub async fn insert(
        conn: &mut PgConnection,
        content: &BannerContent,
        is_active: bool,
    ) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO banners (title, body, url, is_active) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.url)
        .bind(is_active)
        .fetch_one(conn)
        .await?;
        Ok(row.0)
    }

    /// Overwrite content and active flag. Returns `false` if no such banner.
    ///
    /// Takes the row lock, so concurrent updates of one banner serialize here.
    pub async fn update_state(
        conn: &mut PgConnection,
        id: DbId,
        content: &BannerContent,
        is_active: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE banners SET title = $2, body = $3, url = $4, is_active = $5, \
             updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.url)
        .bind(is_active)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite only the content columns. Returns `false` if no such banner.
    pub async fn update_content(
        conn: &mut PgConnection,
        id: DbId,
        content: &BannerContent,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE banners SET title = $2, body = $3, url = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.url)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Content of the active banner bound to `key`.
    pub async fn find_active_content(
        pool: &PgPool,
        key: FeatureTag,
    ) -> Result<Option<ContentRow>, sqlx::Error> {
        sqlx::query_as::<_, ContentRow>(
            "SELECT b.title, b.body, b.url \
             FROM banners b \
             JOIN banner_bindings bb ON bb.banner_id = b.id \
             WHERE bb.feature_id = $1 AND bb.tag_id = $2 AND b.is_active = TRUE",
        )
        .bind(key.feature_id)
        .bind(key.tag_id)
        .fetch_optional(pool)
        .await
    }

    /// Banners holding any binding on `feature_id` OR `tag_id`, each with all
    /// of its tags, ordered by id.
    pub async fn list_by_feature_or_tag(
        pool: &PgPool,
        feature_id: FeatureId,
        tag_id: TagId,
    ) -> Result<Vec<BannerListRow>, sqlx::Error> {
        sqlx::query_as::<_, BannerListRow>(
            "SELECT b.id, MIN(bb.feature_id) AS feature_id, \
                    ARRAY_AGG(bb.tag_id ORDER BY bb.tag_id) AS tag_ids, \
                    b.title, b.body, b.url, b.is_active, b.created_at, b.updated_at \
             FROM banners b \
             JOIN banner_bindings bb ON bb.banner_id = b.id \
             WHERE b.id IN ( \
                 SELECT banner_id FROM banner_bindings \
                 WHERE feature_id = $1 OR tag_id = $2 \
             ) \
             GROUP BY b.id \
             ORDER BY b.id",
        )
        .bind(feature_id)
        .bind(tag_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a banner row. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
