use {
    super::naming::{TableName, TableNamer},
    super::policy::AuditabilityPolicy,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritanceType {
    #[default]
    None,
    SingleTable,
    Joined,
}

/// How the persistence layer stores one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMapping {
    pub entity: String,
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub inheritance: InheritanceType,
}

impl EntityMapping {
    pub fn new(entity: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            table: table.into(),
            schema: None,
            inheritance: InheritanceType::None,
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_inheritance(mut self, inheritance: InheritanceType) -> Self {
        self.inheritance = inheritance;
        self
    }

    pub fn is_single_table(&self) -> bool {
        self.inheritance == InheritanceType::SingleTable
    }
}

/// Every entity the persistence layer knows about, auditable or not.
pub trait EntityCatalog: Send + Sync {
    fn entities(&self) -> Vec<EntityMapping>;

    fn mapping(&self, entity: &str) -> Option<EntityMapping> {
        self.entities().into_iter().find(|m| m.entity == entity)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    mappings: Vec<EntityMapping>,
}

impl StaticCatalog {
    pub fn new(mappings: Vec<EntityMapping>) -> Self {
        Self { mappings }
    }
}

impl EntityCatalog for StaticCatalog {
    fn entities(&self) -> Vec<EntityMapping> {
        self.mappings.clone()
    }
}

/// Auditable entities with their live table, keyed and sorted by entity id.
pub fn auditable_entities(
    catalog: &dyn EntityCatalog,
    policy: &dyn AuditabilityPolicy,
    namer: &TableNamer,
) -> BTreeMap<String, TableName> {
    catalog
        .entities()
        .into_iter()
        .filter(|m| policy.is_auditable(&m.entity))
        .map(|m| {
            let table = namer.entity_table(&m);
            (m.entity, table)
        })
        .collect()
}
