use crate::domain::{
    naming::TableName,
    query::{quote_identifier, quote_table},
    schema::{ColumnDef, ColumnType, IndexDef, Schema, TableDef},
};

/// Compares schema graphs and renders the Postgres DDL between them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresPlatform;

impl PostgresPlatform {
    /// Statements turning `from` into `to`: new tables, then altered tables,
    /// then dropped tables. Equal graphs produce nothing.
    pub fn migrate_sql(&self, from: &Schema, to: &Schema) -> Vec<String> {
        let mut sql = Vec::new();

        for table in to.tables().filter(|t| !from.has_table(&t.name)) {
            sql.extend(self.create_table_sql(table));
        }

        for table in to.tables() {
            if let Some(current) = from.table(&table.name) {
                sql.extend(self.alter_table_sql(current, table));
            }
        }

        for table in from.tables().filter(|t| !to.has_table(&t.name)) {
            sql.push(format!("DROP TABLE {}", quote_table(&table.name)));
        }

        sql
    }

    pub fn create_table_sql(&self, table: &TableDef) -> Vec<String> {
        let mut parts: Vec<String> = table.columns.iter().map(|c| self.column_sql(c)).collect();
        if let Some(pk) = &table.primary_key {
            parts.push(format!("PRIMARY KEY ({})", column_list(&pk.columns)));
        }

        let mut sql = vec![format!(
            "CREATE TABLE {} ({})",
            quote_table(&table.name),
            parts.join(", ")
        )];
        sql.extend(
            table
                .indices
                .iter()
                .map(|index| self.create_index_sql(&table.name, index)),
        );
        sql
    }

    pub fn alter_table_sql(&self, from: &TableDef, to: &TableDef) -> Vec<String> {
        let table = quote_table(&to.name);
        let mut sql = Vec::new();

        for index in &from.indices {
            if to.index(&index.name) != Some(index) {
                sql.push(self.drop_index_sql(&from.name, &index.name));
            }
        }

        let pk_columns = |t: &TableDef| t.primary_key.as_ref().map(|pk| pk.columns.clone());
        let pk_changed = pk_columns(from) != pk_columns(to);
        if pk_changed {
            if let Some(pk) = &from.primary_key {
                let name = pk
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}_pkey", from.name.table()));
                sql.push(format!(
                    "ALTER TABLE {table} DROP CONSTRAINT {}",
                    quote_identifier(&name)
                ));
            }
        }

        for column in &from.columns {
            if !to.has_column(&column.name) {
                sql.push(format!(
                    "ALTER TABLE {table} DROP COLUMN {}",
                    quote_identifier(&column.name)
                ));
            }
        }

        for column in &to.columns {
            match from.column(&column.name) {
                None => sql.push(format!("ALTER TABLE {table} ADD {}", self.column_sql(column))),
                Some(current) if !current.same_definition(column) => {
                    sql.extend(self.alter_column_sql(&table, current, column));
                }
                Some(_) => {}
            }
        }

        if pk_changed {
            if let Some(pk) = &to.primary_key {
                sql.push(format!(
                    "ALTER TABLE {table} ADD PRIMARY KEY ({})",
                    column_list(&pk.columns)
                ));
            }
        }

        for index in &to.indices {
            if from.index(&index.name) != Some(index) {
                sql.push(self.create_index_sql(&to.name, index));
            }
        }

        sql
    }

    fn alter_column_sql(&self, table: &str, from: &ColumnDef, to: &ColumnDef) -> Vec<String> {
        let column = quote_identifier(&to.name);
        let prefix = format!("ALTER TABLE {table} ALTER COLUMN {column}");
        let mut sql = Vec::new();

        if from.column_type != to.column_type {
            let ty = self.column_type_sql(&to.column_type);
            sql.push(format!("{prefix} TYPE {ty} USING {column}::{ty}"));
        }
        if from.not_null != to.not_null {
            let action = if to.not_null { "SET" } else { "DROP" };
            sql.push(format!("{prefix} {action} NOT NULL"));
        }
        if from.default != to.default {
            match &to.default {
                Some(expr) => sql.push(format!("{prefix} SET DEFAULT {expr}")),
                None => sql.push(format!("{prefix} DROP DEFAULT")),
            }
        }
        if from.autoincrement != to.autoincrement {
            if to.autoincrement {
                sql.push(format!("{prefix} ADD GENERATED BY DEFAULT AS IDENTITY"));
            } else {
                sql.push(format!("{prefix} DROP IDENTITY IF EXISTS"));
                // A serial column keeps its nextval() default otherwise.
                if to.default.is_none() {
                    sql.push(format!("{prefix} DROP DEFAULT"));
                }
            }
        }

        sql
    }

    pub fn column_sql(&self, column: &ColumnDef) -> String {
        let mut sql = format!(
            "{} {}",
            quote_identifier(&column.name),
            self.column_type_sql(&column.column_type)
        );
        if column.autoincrement {
            sql.push_str(" GENERATED BY DEFAULT AS IDENTITY");
        }
        if column.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(expr) = column.default.as_ref().filter(|_| !column.autoincrement) {
            sql.push_str(" DEFAULT ");
            sql.push_str(expr);
        }
        sql
    }

    pub fn column_type_sql(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Integer => "INT".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::String { length } => format!("VARCHAR({length})"),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::DateTime => "TIMESTAMP(0) WITHOUT TIME ZONE".to_string(),
            ColumnType::DateTimeTz => "TIMESTAMP(0) WITH TIME ZONE".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Other(name) => name.to_uppercase(),
        }
    }

    /// Maps an `information_schema.columns` type back onto a [`ColumnType`].
    /// Timestamps only match the modelled types at precision 0; any other
    /// precision is kept verbatim so it differs and gets converged.
    pub fn column_type_from_catalog(
        &self,
        data_type: &str,
        length: Option<i32>,
        precision: Option<i32>,
    ) -> ColumnType {
        let timestamp = |modelled: ColumnType, zone: &str| match precision {
            None | Some(0) => modelled,
            Some(p) => ColumnType::Other(format!("timestamp({p}) {zone}")),
        };

        match data_type {
            "integer" => ColumnType::Integer,
            "bigint" => ColumnType::BigInt,
            "character varying" => match length.and_then(|l| u32::try_from(l).ok()) {
                Some(length) => ColumnType::String { length },
                None => ColumnType::Other(data_type.to_string()),
            },
            "text" => ColumnType::Text,
            "json" => ColumnType::Json,
            "timestamp without time zone" => timestamp(ColumnType::DateTime, "without time zone"),
            "timestamp with time zone" => timestamp(ColumnType::DateTimeTz, "with time zone"),
            "boolean" => ColumnType::Boolean,
            other => ColumnType::Other(other.to_string()),
        }
    }

    fn create_index_sql(&self, table: &TableName, index: &IndexDef) -> String {
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            if index.unique { "UNIQUE " } else { "" },
            quote_identifier(&index.name),
            quote_table(table),
            column_list(&index.columns)
        )
    }

    /// Index names live in the table's schema.
    fn drop_index_sql(&self, table: &TableName, index: &str) -> String {
        match table.schema() {
            Some(schema) => format!(
                "DROP INDEX {}.{}",
                quote_identifier(schema),
                quote_identifier(index)
            ),
            None => format!("DROP INDEX {}", quote_identifier(index)),
        }
    }
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}
