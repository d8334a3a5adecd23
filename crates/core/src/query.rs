//! Query normalizer.
//!
//! Request parameters arrive untyped. [`Query::from_params`] never fails:
//! absent or unparsable values fall back to zero / `false`. Whether a query
//! may use the single-banner read path is decided separately by
//! [`Query::single_banner`].

use crate::banner::FeatureTag;
use crate::error::CoreError;
use crate::types::{FeatureId, TagId};

pub const PARAM_FEATURE_ID: &str = "feature_id";
pub const PARAM_TAG_ID: &str = "tag_id";
pub const PARAM_LIMIT: &str = "limit";
pub const PARAM_OFFSET: &str = "offset";
pub const PARAM_USE_LAST_REVISION: &str = "use_last_revision";

/// Typed query descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Query {
    pub feature_id: FeatureId,
    pub tag_id: TagId,
    pub limit: i64,
    pub offset: i64,
    /// Caller asked for guaranteed-fresh data.
    pub strict: bool,
}

/// Which read path serves a single-banner query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPath {
    /// Store-backed read; refreshes the cache on success.
    Strict,
    /// Cache-only read; may be stale.
    Cached,
}

impl Query {
    /// Build a query from raw key/value pairs. The first occurrence of a key wins.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Query::default();
        let mut seen = [false; 5];

        for (key, value) in params {
            let value = value.as_ref().trim();
            let slot = match key.as_ref() {
                PARAM_FEATURE_ID => 0,
                PARAM_TAG_ID => 1,
                PARAM_LIMIT => 2,
                PARAM_OFFSET => 3,
                PARAM_USE_LAST_REVISION => 4,
                _ => continue,
            };
            if seen[slot] {
                continue;
            }
            seen[slot] = true;

            match slot {
                0 => query.feature_id = value.parse().unwrap_or(0),
                1 => query.tag_id = value.parse().unwrap_or(0),
                2 => query.limit = value.parse::<i64>().unwrap_or(0).max(0),
                3 => query.offset = value.parse::<i64>().unwrap_or(0).max(0),
                _ => query.strict = parse_bool(value),
            }
        }

        query
    }

    /// Both `feature_id` and `tag_id` are set.
    pub fn is_single_banner(&self) -> bool {
        self.feature_id != 0 && self.tag_id != 0
    }

    /// The binding addressed by this query, or a validation error when the
    /// query is not eligible for the single-banner path.
    pub fn single_banner(&self) -> Result<FeatureTag, CoreError> {
        if self.is_single_banner() {
            Ok(FeatureTag::new(self.feature_id, self.tag_id))
        } else {
            Err(CoreError::Validation(format!(
                "both {PARAM_FEATURE_ID} and {PARAM_TAG_ID} are required, \
                 got {PARAM_FEATURE_ID}={} {PARAM_TAG_ID}={}",
                self.feature_id, self.tag_id
            )))
        }
    }

    pub fn read_path(&self) -> ReadPath {
        if self.strict {
            ReadPath::Strict
        } else {
            ReadPath::Cached
        }
    }

    /// Apply `offset` then `limit` to a listing. A zero limit means unlimited.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let iter = items.into_iter().skip(offset);
        if self.limit > 0 {
            let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
            iter.take(limit).collect()
        } else {
            iter.collect()
        }
    }
}

/// Boolean spellings accepted for flags. Anything unrecognised is `false`.
fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "TRUE" | "true" | "True")
}
