pub mod config;
pub mod domain;
pub mod infra;
pub mod services;
pub mod telemetry;

pub use {
    config::AuditConfig,
    domain::error::AuditError,
    services::reader::Reader,
    services::schema_sync::SchemaSyncManager,
};
