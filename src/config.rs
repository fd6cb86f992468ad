//! Audit configuration.
//!
//! Values come from the environment (a `.env` file is honoured) and, for the
//! entity lists, from a JSON document.

use {
    crate::domain::catalog::{EntityMapping, StaticCatalog},
    crate::domain::error::AuditError,
    crate::domain::naming::TableNamer,
    crate::domain::policy::{AccessPolicy, AuditabilityPolicy, EntityOptions},
    serde::Deserialize,
    std::collections::{BTreeMap, BTreeSet},
    std::{env, fs},
};

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub table_prefix: String,
    #[serde(default = "default_table_suffix")]
    pub table_suffix: String,
    #[serde(default = "default_schema")]
    pub default_schema: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub ignored_columns: Vec<String>,
    #[serde(default)]
    pub entities: BTreeMap<String, EntityOptions>,
    #[serde(default)]
    pub mappings: Vec<EntityMapping>,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_table_suffix() -> String {
    "_audit".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    3
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            table_prefix: String::new(),
            table_suffix: default_table_suffix(),
            default_schema: default_schema(),
            enabled: true,
            ignored_columns: Vec::new(),
            entities: BTreeMap::new(),
            mappings: Vec::new(),
            database_url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl AuditConfig {
    pub fn from_json(document: &str) -> Result<Self, AuditError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Reads `DATABASE_URL`, `AUDIT_TABLE_PREFIX`, `AUDIT_TABLE_SUFFIX`,
    /// `AUDIT_DEFAULT_SCHEMA`, `AUDIT_MAX_CONNECTIONS` and the JSON document
    /// named by `AUDIT_ENTITIES_FILE`. Environment values win over the file.
    pub fn from_env() -> Result<Self, AuditError> {
        dotenvy::dotenv().ok();

        let mut config = match env::var("AUDIT_ENTITIES_FILE") {
            Ok(path) => {
                let document = fs::read_to_string(&path)
                    .map_err(|e| AuditError::Config(format!("reading {path}: {e}")))?;
                Self::from_json(&document)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = Some(url);
        }
        if let Ok(prefix) = env::var("AUDIT_TABLE_PREFIX") {
            config.table_prefix = prefix;
        }
        if let Ok(suffix) = env::var("AUDIT_TABLE_SUFFIX") {
            config.table_suffix = suffix;
        }
        if let Ok(schema) = env::var("AUDIT_DEFAULT_SCHEMA") {
            config.default_schema = schema;
        }
        if let Ok(max) = env::var("AUDIT_MAX_CONNECTIONS") {
            config.max_connections = max.parse().map_err(|_| {
                AuditError::Config(format!("AUDIT_MAX_CONNECTIONS is not a number: {max}"))
            })?;
        }

        Ok(config)
    }

    pub fn table_namer(&self) -> TableNamer {
        TableNamer::new(&self.table_prefix, &self.table_suffix)
            .with_default_schema(&self.default_schema)
    }

    pub fn catalog(&self) -> StaticCatalog {
        StaticCatalog::new(self.mappings.clone())
    }
}

impl AuditabilityPolicy for AuditConfig {
    fn is_auditable(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    fn entities(&self) -> BTreeMap<String, EntityOptions> {
        self.entities.clone()
    }
}

impl AccessPolicy for AuditConfig {
    fn roles_for(&self, entity: &str, scope: &str) -> Option<BTreeSet<String>> {
        let roles = self.entities.get(entity)?.roles.as_ref()?.get(scope)?;
        Some(roles.iter().cloned().collect())
    }
}
