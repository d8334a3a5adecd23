//! Banner domain core.
//!
//! Holds everything that does not depend on a concrete backend:
//!
//! - [`banner`]: banner, binding and history types.
//! - [`error`]: the [`CoreError`] taxonomy shared by every crate.
//! - [`query`]: the query normalizer turning raw request parameters into a [`Query`].
//! - [`versioning`]: rules deciding when history advances and bindings change.
//! - [`store`] / [`cache`]: the `ContentStore` and `FastPathCache` capability traits.
//! - [`engine`]: [`BannerEngine`], the orchestrator over both backends.
//! - [`memory`]: in-memory backends satisfying the same contracts.

pub mod banner;
pub mod cache;
pub mod engine;
pub mod error;
pub mod memory;
pub mod query;
pub mod store;
pub mod types;
pub mod versioning;

pub use banner::{Banner, BannerContent, BannerUpdate, FeatureTag, HistoryEntry, NewBanner};
pub use cache::FastPathCache;
pub use engine::{BannerEngine, CachePolicy};
pub use error::{CoreError, CoreResult};
pub use query::{Query, ReadPath};
pub use store::ContentStore;
