use {
    crate::config::AuditConfig,
    crate::domain::error::AuditError,
    sqlx::{PgPool, postgres::PgPoolOptions},
    std::time::Duration,
};

pub async fn connect(config: &AuditConfig) -> Result<PgPool, AuditError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AuditError::Config("DATABASE_URL must be set".into()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(url)
        .await?;

    tracing::info!(max_connections = config.max_connections, "connected to audit database");
    Ok(pool)
}
