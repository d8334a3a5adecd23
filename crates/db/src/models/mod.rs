//! Row types for the banner tables.

pub mod banner;
