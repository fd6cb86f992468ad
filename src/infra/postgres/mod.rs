pub mod audit_repo;
pub mod platform;
pub mod pool;
pub mod schema_repo;
