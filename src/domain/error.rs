use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("not auditable: {0}")]
    NotAuditable(String),

    #[error("access denied: {scope} on {entity}")]
    AccessDenied { entity: String, scope: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("schema operation failed: {message} ({statement})")]
    SchemaOperation { statement: String, message: String },

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store: {0}")]
    Store(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),
}

impl AuditError {
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}
