/// Catalog record ids are server-assigned positive integers.
pub type RecordId = i64;
