//! Repository layer.
//!
//! Each repository is a zero-sized struct. Steps that run inside a store
//! transaction take `&mut PgConnection`; standalone reads take `&PgPool`.

pub mod banner_repo;
pub mod binding_repo;
pub mod history_repo;

pub use banner_repo::BannerRepo;
pub use binding_repo::BannerBindingRepo;
pub use history_repo::BannerHistoryRepo;
