//! Fast-path cache capability.
//!
//! A non-authoritative key-value side store mapping `cache_key(feature, tag)`
//! to the last content a strict read returned. Entries may be stale; a
//! reader must only ever see a complete `BannerContent`.

use async_trait::async_trait;

use crate::banner::{BannerContent, FeatureTag};
use crate::error::CoreResult;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

#[async_trait]
pub trait FastPathCache: Send + Sync {
    /// `Ok(None)` means the key was never cached (or has been purged).
    async fn get(&self, key: u64) -> CoreResult<Option<BannerContent>>;

    async fn put(&self, key: u64, content: &BannerContent) -> CoreResult<()>;

    /// Purge the given keys. Absent keys are ignored.
    async fn remove(&self, keys: &[u64]) -> CoreResult<()>;
}

/// Stable 64-bit FNV-1a hash of a feature/tag pair.
///
/// Both ids are hashed as fixed-width little-endian bytes, so `(1, 23)` and
/// `(12, 3)` never collide by concatenation.
pub fn cache_key(pair: FeatureTag) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in pair
        .feature_id
        .to_le_bytes()
        .into_iter()
        .chain(pair.tag_id.to_le_bytes())
    {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic() {
        let pair = FeatureTag::new(1, 1);
        assert_eq!(cache_key(pair), cache_key(pair));
        assert_eq!(pair.cache_key(), cache_key(pair));
    }

    #[test]
    fn key_distinguishes_split_digits() {
        assert_ne!(
            cache_key(FeatureTag::new(1, 23)),
            cache_key(FeatureTag::new(12, 3))
        );
    }

    #[test]
    fn key_is_order_sensitive() {
        assert_ne!(
            cache_key(FeatureTag::new(1, 2)),
            cache_key(FeatureTag::new(2, 1))
        );
    }
}
