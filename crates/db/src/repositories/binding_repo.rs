//! Repository for the `banner_bindings` table.

use banner_core::banner::FeatureTag;
use banner_core::types::DbId;
use sqlx::PgConnection;

use crate::models::banner::BindingRow;

/// Provides insert, lookup and delete operations for feature/tag bindings.
pub struct BannerBindingRepo;

impl BannerBindingRepo {
    /// Bind `key` to a banner. A pair that is already bound fails with a
    /// unique violation on `uq_banner_bindings_feature_tag`.
    pub async fn insert(
        conn: &mut PgConnection,
        banner_id: DbId,
        key: FeatureTag,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO banner_bindings (feature_id, tag_id, banner_id) VALUES ($1, $2, $3)",
        )
        .bind(key.feature_id)
        .bind(key.tag_id)
        .bind(banner_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// All bindings of a banner, ordered by tag.
    pub async fn list_for_banner(
        conn: &mut PgConnection,
        banner_id: DbId,
    ) -> Result<Vec<FeatureTag>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BindingRow>(
            "SELECT feature_id, tag_id FROM banner_bindings \
             WHERE banner_id = $1 \
             ORDER BY tag_id",
        )
        .bind(banner_id)
        .fetch_all(conn)
        .await?;
        Ok(rows.into_iter().map(FeatureTag::from).collect())
    }

    /// Remove every binding of a banner and return what was removed.
    pub async fn delete_for_banner(
        conn: &mut PgConnection,
        banner_id: DbId,
    ) -> Result<Vec<FeatureTag>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BindingRow>(
            "DELETE FROM banner_bindings WHERE banner_id = $1 RETURNING feature_id, tag_id",
        )
        .bind(banner_id)
        .fetch_all(conn)
        .await?;
        Ok(rows.into_iter().map(FeatureTag::from).collect())
    }
}
