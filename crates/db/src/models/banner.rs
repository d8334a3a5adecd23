//! Banner, binding and history rows.

use banner_core::banner::{Banner, BannerContent, FeatureTag, HistoryEntry};
use banner_core::types::{DbId, FeatureId, TagId, Timestamp};
use sqlx::FromRow;

/// A row from `banners` joined with its aggregated bindings.
#[derive(Debug, Clone, FromRow)]
pub struct BannerListRow {
    pub id: DbId,
    pub feature_id: FeatureId,
    pub tag_ids: Vec<TagId>,
    pub title: String,
    pub body: String,
    pub url: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<BannerListRow> for Banner {
    fn from(row: BannerListRow) -> Self {
        Banner {
            id: row.id,
            feature_id: row.feature_id,
            tag_ids: row.tag_ids,
            content: BannerContent {
                title: row.title,
                body: row.body,
                url: row.url,
            },
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The content columns of a `banners` row.
#[derive(Debug, Clone, FromRow)]
pub struct ContentRow {
    pub title: String,
    pub body: String,
    pub url: String,
}

impl From<ContentRow> for BannerContent {
    fn from(row: ContentRow) -> Self {
        BannerContent {
            title: row.title,
            body: row.body,
            url: row.url,
        }
    }
}

/// A row from `banner_bindings`.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct BindingRow {
    pub feature_id: FeatureId,
    pub tag_id: TagId,
}

impl From<BindingRow> for FeatureTag {
    fn from(row: BindingRow) -> Self {
        FeatureTag::new(row.feature_id, row.tag_id)
    }
}

/// A row from `banner_history`.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub banner_id: DbId,
    pub version: i32,
    pub title: String,
    pub body: String,
    pub url: String,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(row: HistoryRow) -> Self {
        HistoryEntry {
            banner_id: row.banner_id,
            version: row.version,
            content: BannerContent {
                title: row.title,
                body: row.body,
                url: row.url,
            },
        }
    }
}
