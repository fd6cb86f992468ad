use {
    super::catalog::EntityMapping,
    derive_more::Display,
    serde::{Deserialize, Serialize},
};

/// Possibly schema-qualified table name (`table` or `schema.table`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn qualified(schema: Option<&str>, table: &str) -> Self {
        match schema {
            Some(schema) if !schema.is_empty() => Self(format!("{schema}.{table}")),
            _ => Self(table.to_string()),
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.0.split_once('.').map(|(schema, _)| schema)
    }

    pub fn table(&self) -> &str {
        self.0
            .split_once('.')
            .map_or(self.0.as_str(), |(_, table)| table)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Maps live tables to their shadow audit tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNamer {
    prefix: String,
    suffix: String,
    /// Schema whose tables are named without a qualifier.
    default_schema: Option<String>,
}

impl Default for TableNamer {
    fn default() -> Self {
        Self::new("", "_audit")
    }
}

impl TableNamer {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            default_schema: None,
        }
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Live table of `mapping`; a mapping in the default schema is left unqualified.
    pub fn entity_table(&self, mapping: &EntityMapping) -> TableName {
        let schema = mapping
            .schema
            .as_deref()
            .filter(|s| Some(*s) != self.default_schema.as_deref());
        TableName::qualified(schema, &mapping.table)
    }

    pub fn entity_audit_table(&self, mapping: &EntityMapping) -> TableName {
        self.audit_table(&self.entity_table(mapping))
    }

    /// `schema.table` becomes `schema.<prefix>table<suffix>`; the schema part is kept.
    pub fn audit_table(&self, live: &TableName) -> TableName {
        let table = format!("{}{}{}", self.prefix, live.table(), self.suffix);
        TableName::qualified(live.schema(), &table)
    }
}
