use {
    super::platform::PostgresPlatform,
    crate::domain::error::AuditError,
    crate::domain::naming::TableName,
    crate::domain::schema::{ColumnDef, IndexDef, PrimaryKey, Schema, TableDef},
    crate::domain::store::{SchemaStore, StoreFuture},
    sqlx::PgPool,
};

const SYSTEM_SCHEMAS: &str = "('pg_catalog', 'information_schema', 'pg_toast')";

#[derive(Debug, sqlx::FromRow)]
struct TableRow {
    table_schema: String,
    table_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ColumnRow {
    table_schema: String,
    table_name: String,
    column_name: String,
    data_type: String,
    character_maximum_length: Option<i32>,
    datetime_precision: Option<i32>,
    is_nullable: String,
    column_default: Option<String>,
    is_identity: String,
}

#[derive(Debug, sqlx::FromRow)]
struct IndexRow {
    schema_name: String,
    table_name: String,
    index_name: String,
    is_primary: bool,
    is_unique: bool,
    columns: Vec<String>,
}

/// Introspects and alters one Postgres database.
#[derive(Debug, Clone)]
pub struct PgSchemaStore {
    pool: PgPool,
    default_schema: String,
    platform: PostgresPlatform,
}

impl PgSchemaStore {
    /// Tables in `default_schema` are named without a schema qualifier.
    pub fn new(pool: PgPool, default_schema: impl Into<String>) -> Self {
        Self {
            pool,
            default_schema: default_schema.into(),
            platform: PostgresPlatform,
        }
    }

    fn table_name(&self, schema: &str, table: &str) -> TableName {
        if schema == self.default_schema {
            TableName::new(table)
        } else {
            TableName::qualified(Some(schema), table)
        }
    }

    async fn current_schema_inner(&self) -> Result<Schema, AuditError> {
        let tables: Vec<TableRow> = sqlx::query_as(&format!(
            r#"
            SELECT table_schema::text AS table_schema, table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_type = 'BASE TABLE' AND table_schema NOT IN {SYSTEM_SCHEMAS}
            ORDER BY table_schema, table_name
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        let columns: Vec<ColumnRow> = sqlx::query_as(&format!(
            r#"
            SELECT table_schema::text AS table_schema, table_name::text AS table_name,
                   column_name::text AS column_name, data_type::text AS data_type,
                   character_maximum_length::int AS character_maximum_length,
                   datetime_precision::int AS datetime_precision,
                   is_nullable::text AS is_nullable, column_default::text AS column_default,
                   is_identity::text AS is_identity
            FROM information_schema.columns
            WHERE table_schema NOT IN {SYSTEM_SCHEMAS}
            ORDER BY table_schema, table_name, ordinal_position
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        let indices: Vec<IndexRow> = sqlx::query_as(&format!(
            r#"
            SELECT n.nspname::text AS schema_name, t.relname::text AS table_name,
                   i.relname::text AS index_name, ix.indisprimary AS is_primary,
                   ix.indisunique AS is_unique,
                   array_agg(a.attname::text ORDER BY k.ord) AS columns
            FROM pg_index ix
            JOIN pg_class t ON t.oid = ix.indrelid
            JOIN pg_class i ON i.oid = ix.indexrelid
            JOIN pg_namespace n ON n.oid = t.relnamespace
            JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord) ON true
            JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum
            WHERE n.nspname NOT IN {SYSTEM_SCHEMAS}
            GROUP BY n.nspname, t.relname, i.relname, ix.indisprimary, ix.indisunique
            ORDER BY 1, 2, 3
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut schema = Schema::new();
        for row in tables {
            schema.add_table(TableDef::new(self.table_name(&row.table_schema, &row.table_name)));
        }

        for row in columns {
            let name = self.table_name(&row.table_schema, &row.table_name);
            if let Some(table) = schema.table_mut(&name) {
                table.columns.push(column_from_row(&self.platform, row));
            }
        }

        for row in indices {
            let name = self.table_name(&row.schema_name, &row.table_name);
            let Some(table) = schema.table_mut(&name) else {
                continue;
            };
            if row.is_primary {
                table.primary_key = Some(PrimaryKey {
                    name: Some(row.index_name),
                    columns: row.columns,
                });
            } else {
                table.indices.push(IndexDef {
                    name: row.index_name,
                    columns: row.columns,
                    unique: row.is_unique,
                });
            }
        }

        tracing::debug!(tables = schema.tables().count(), "introspected schema");
        Ok(schema)
    }

    async fn execute_inner(&self, statement: &str) -> Result<(), AuditError> {
        sqlx::raw_sql(statement).execute(&self.pool).await?;
        Ok(())
    }
}

fn column_from_row(platform: &PostgresPlatform, row: ColumnRow) -> ColumnDef {
    let serial = row
        .column_default
        .as_deref()
        .is_some_and(|d| d.starts_with("nextval("));
    let autoincrement = serial || row.is_identity == "YES";

    ColumnDef {
        column_type: platform.column_type_from_catalog(
            &row.data_type,
            row.character_maximum_length,
            row.datetime_precision,
        ),
        not_null: row.is_nullable == "NO",
        default: row.column_default.filter(|_| !autoincrement),
        autoincrement,
        name: row.column_name,
    }
}

impl SchemaStore for PgSchemaStore {
    fn current_schema(&self) -> StoreFuture<'_, Schema> {
        Box::pin(async move { self.current_schema_inner().await })
    }

    fn migrate_sql(&self, from: &Schema, to: &Schema) -> Vec<String> {
        self.platform.migrate_sql(from, to)
    }

    fn execute<'a>(&'a self, statement: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.execute_inner(statement).await })
    }
}
