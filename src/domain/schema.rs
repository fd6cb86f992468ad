use {
    super::naming::TableName,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    BigInt,
    String { length: u32 },
    Text,
    Json,
    /// Timestamp without time zone.
    DateTime,
    DateTimeTz,
    Boolean,
    /// Anything introspection could not classify, kept by its catalog name.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub not_null: bool,
    /// Raw SQL default expression.
    pub default: Option<String>,
    pub autoincrement: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            not_null: false,
            default: None,
            autoincrement: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn autoincrement(mut self) -> Self {
        self.autoincrement = true;
        self.not_null = true;
        self
    }

    /// Same definition, ignoring the name.
    pub fn same_definition(&self, other: &ColumnDef) -> bool {
        self.column_type == other.column_type
            && self.not_null == other.not_null
            && self.default == other.default
            && self.autoincrement == other.autoincrement
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    /// Constraint name as introspected; `None` for keys not yet created.
    pub name: Option<String>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: TableName,
    pub columns: Vec<ColumnDef>,
    pub indices: Vec<IndexDef>,
    pub primary_key: Option<PrimaryKey>,
}

impl TableDef {
    pub fn new(name: TableName) -> Self {
        Self {
            name,
            columns: Vec::new(),
            indices: Vec::new(),
            primary_key: None,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn add_column(&mut self, column: ColumnDef) {
        self.drop_column(&column.name);
        self.columns.push(column);
    }

    pub fn drop_column(&mut self, name: &str) {
        self.columns.retain(|c| c.name != name);
    }

    pub fn index(&self, name: &str) -> Option<&IndexDef> {
        self.indices.iter().find(|i| i.name == name)
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    pub fn add_index(&mut self, index: IndexDef) {
        self.drop_index(&index.name);
        self.indices.push(index);
    }

    pub fn drop_index(&mut self, name: &str) {
        self.indices.retain(|i| i.name != name);
    }

    pub fn set_primary_key(&mut self, columns: Vec<String>) {
        self.primary_key = Some(PrimaryKey {
            name: None,
            columns,
        });
    }

    pub fn drop_primary_key(&mut self) {
        self.primary_key = None;
    }

    /// Removes indices and primary key referencing columns the table no longer has.
    pub fn prune_dangling_indices(&mut self) {
        let columns: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        let covered = |cols: &[String]| cols.iter().all(|c| columns.contains(c));

        self.indices.retain(|i| covered(&i.columns));
        if self
            .primary_key
            .as_ref()
            .is_some_and(|pk| !covered(&pk.columns))
        {
            self.primary_key = None;
        }
    }
}

/// Table graph of one database, as introspected or as targeted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    tables: BTreeMap<TableName, TableDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }

    pub fn table(&self, name: &TableName) -> Option<&TableDef> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &TableName) -> Option<&mut TableDef> {
        self.tables.get_mut(name)
    }

    pub fn has_table(&self, name: &TableName) -> bool {
        self.tables.contains_key(name)
    }

    pub fn add_table(&mut self, table: TableDef) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn drop_table(&mut self, name: &TableName) -> Option<TableDef> {
        self.tables.remove(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub column: String,
    pub kind: IndexKind,
}

/// An index of [`AuditTableSpec`] instantiated for one physical table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedIndex {
    pub name: String,
    pub columns: Vec<String>,
    pub kind: IndexKind,
}

/// Uniform shape every audit table converges to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTableSpec {
    pub columns: Vec<ColumnDef>,
    pub indices: Vec<IndexSpec>,
}

impl Default for AuditTableSpec {
    fn default() -> Self {
        use ColumnType::{DateTime, Integer, Json};

        let varchar = |length| ColumnType::String { length };
        let columns = vec![
            ColumnDef::new("id", Integer).autoincrement(),
            ColumnDef::new("type", varchar(10)).not_null(),
            ColumnDef::new("object_id", varchar(255)),
            ColumnDef::new("discriminator", varchar(255)),
            ColumnDef::new("transaction_hash", varchar(40)),
            ColumnDef::new("diffs", Json),
            ColumnDef::new("blame_id", varchar(255)),
            ColumnDef::new("blame_user", varchar(255)),
            ColumnDef::new("blame_user_fqdn", varchar(255)),
            ColumnDef::new("blame_user_firewall", varchar(100)),
            ColumnDef::new("ip", varchar(45)),
            ColumnDef::new("created_at", DateTime).not_null(),
        ];

        let secondary = |column: &str| IndexSpec {
            column: column.to_string(),
            kind: IndexKind::Secondary,
        };
        let indices = vec![
            secondary("type"),
            secondary("object_id"),
            secondary("discriminator"),
            secondary("transaction_hash"),
            secondary("blame_id"),
            secondary("created_at"),
            IndexSpec {
                column: "id".to_string(),
                kind: IndexKind::Primary,
            },
        ];

        Self { columns, indices }
    }
}

impl AuditTableSpec {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index_name(table: &TableName, column: &str) -> String {
        format!("{}_{column}_idx", table.as_str().replace('.', "_"))
    }

    /// Indices for `table`, secondary ones first and the primary key last.
    pub fn indices_for(&self, table: &TableName) -> Vec<ExpectedIndex> {
        let (primary, secondary): (Vec<_>, Vec<_>) = self
            .indices
            .iter()
            .partition(|spec| spec.kind == IndexKind::Primary);

        secondary
            .into_iter()
            .chain(primary)
            .map(|spec| ExpectedIndex {
                name: match spec.kind {
                    IndexKind::Primary => format!("{}_pkey", table.table()),
                    IndexKind::Secondary => Self::index_name(table, &spec.column),
                },
                columns: vec![spec.column.clone()],
                kind: spec.kind,
            })
            .collect()
    }
}
