use {
    super::entry::AuditEntry,
    super::error::AuditError,
    super::query::AuditQuery,
    super::schema::Schema,
    std::{future::Future, pin::Pin},
};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AuditError>> + Send + 'a>>;

/// Executes reader queries against audit tables.
pub trait AuditStore: Send + Sync {
    fn fetch_entries<'a>(&'a self, query: &'a AuditQuery) -> StoreFuture<'a, Vec<AuditEntry>>;

    /// `None` when the store cannot determine the count.
    fn fetch_count<'a>(&'a self, query: &'a AuditQuery) -> StoreFuture<'a, Option<i64>>;
}

/// Structural metadata and DDL execution for one database.
pub trait SchemaStore: Send + Sync {
    fn current_schema(&self) -> StoreFuture<'_, Schema>;

    /// Platform statements turning `from` into `to`.
    fn migrate_sql(&self, from: &Schema, to: &Schema) -> Vec<String>;

    fn execute<'a>(&'a self, statement: &'a str) -> StoreFuture<'a, ()>;
}
