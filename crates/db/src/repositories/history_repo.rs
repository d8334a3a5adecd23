//! Repository for the append-only `banner_history` table.

use banner_core::banner::{BannerContent, HistoryEntry};
use banner_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::banner::HistoryRow;

const COLUMNS: &str = "banner_id, version, title, body, url";

/// Provides append, latest-version and listing operations for banner history.
pub struct BannerHistoryRepo;

impl BannerHistoryRepo {
    pub async fn insert(
        conn: &mut PgConnection,
        banner_id: DbId,
        version: i32,
        content: &BannerContent,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO banner_history (banner_id, version, title, body, url) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(banner_id)
        .bind(version)
        .bind(&content.title)
        .bind(&content.body)
        .bind(&content.url)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// The highest-version snapshot of a banner.
    pub async fn latest(
        conn: &mut PgConnection,
        banner_id: DbId,
    ) -> Result<Option<HistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM banner_history \
             WHERE banner_id = $1 \
             ORDER BY version DESC \
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, HistoryRow>(&query)
            .bind(banner_id)
            .fetch_optional(conn)
            .await?;
        Ok(row.map(HistoryEntry::from))
    }

    /// Full history of a banner in ascending version order.
    pub async fn list_by_banner(
        pool: &PgPool,
        banner_id: DbId,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM banner_history \
             WHERE banner_id = $1 \
             ORDER BY version ASC"
        );
        let rows = sqlx::query_as::<_, HistoryRow>(&query)
            .bind(banner_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    /// Remove a banner's whole history. Returns the number of rows removed.
    pub async fn delete_for_banner(
        conn: &mut PgConnection,
        banner_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM banner_history WHERE banner_id = $1")
            .bind(banner_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
