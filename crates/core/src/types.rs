/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Feature and tag identifiers are assigned by an upstream catalogue.
pub type FeatureId = i64;
pub type TagId = i64;
