/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Document versions are small monotonically increasing integers, owned by
/// the storage layer. Clients echo them back as a `baseVersion`; they never
/// assign them.
pub type Version = i32;
