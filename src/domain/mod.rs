pub mod catalog;
pub mod entry;
pub mod error;
pub mod filter;
pub mod naming;
pub mod page;
pub mod policy;
pub mod query;
pub mod schema;
pub mod store;
