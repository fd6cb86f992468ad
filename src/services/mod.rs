pub mod access;
pub mod query_builder;
pub mod reader;
pub mod schema_differ;
pub mod schema_sync;
