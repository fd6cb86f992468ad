use {
    super::entry::OperationType,
    super::naming::TableName,
    chrono::{DateTime, Utc},
    std::fmt::Write,
};

/// Columns selected for entry queries, in `AuditEntry` order.
pub const ENTRY_COLUMNS: &[&str] = &[
    "id",
    "type",
    "object_id",
    "discriminator",
    "transaction_hash",
    "diffs",
    "blame_id",
    "blame_user",
    "blame_user_fqdn",
    "blame_user_firewall",
    "ip",
    "created_at",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Discriminator(String),
    ObjectId(String),
    TransactionHash(String),
    TypeIn(Vec<OperationType>),
    CreatedFrom(DateTime<Utc>),
    CreatedUntil(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    TextList(Vec<String>),
    Timestamp(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Entries,
    Count,
}

/// A fully composed, parametrized query against one audit table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    pub table: TableName,
    pub predicates: Vec<Predicate>,
    pub projection: Projection,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl AuditQuery {
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            predicates: Vec::new(),
            projection: Projection::Entries,
            offset: None,
            limit: None,
        }
    }

    /// Same predicates, projected to a row count without ordering or paging.
    pub fn to_count(&self) -> Self {
        Self {
            projection: Projection::Count,
            offset: None,
            limit: None,
            ..self.clone()
        }
    }

    /// Renders Postgres SQL with `$n` placeholders, params in placeholder order.
    pub fn to_sql(&self) -> (String, Vec<SqlParam>) {
        let mut sql = match self.projection {
            Projection::Entries => format!(
                "SELECT {} FROM {}",
                ENTRY_COLUMNS
                    .iter()
                    .map(|c| quote_identifier(c))
                    .collect::<Vec<_>>()
                    .join(", "),
                quote_table(&self.table)
            ),
            Projection::Count => format!("SELECT COUNT(id) FROM {}", quote_table(&self.table)),
        };

        let mut params = Vec::with_capacity(self.predicates.len());
        let mut clauses = Vec::with_capacity(self.predicates.len());
        for predicate in &self.predicates {
            let n = params.len() + 1;
            let (clause, param) = match predicate {
                Predicate::Discriminator(v) => {
                    (format!("discriminator = ${n}"), SqlParam::Text(v.clone()))
                }
                Predicate::ObjectId(v) => (format!("object_id = ${n}"), SqlParam::Text(v.clone())),
                Predicate::TransactionHash(v) => (
                    format!("transaction_hash = ${n}"),
                    SqlParam::Text(v.clone()),
                ),
                Predicate::TypeIn(types) => (
                    format!("\"type\" = ANY(${n})"),
                    SqlParam::TextList(types.iter().map(|t| t.as_str().to_string()).collect()),
                ),
                Predicate::CreatedFrom(at) => {
                    (format!("created_at >= ${n}"), SqlParam::Timestamp(*at))
                }
                Predicate::CreatedUntil(at) => {
                    (format!("created_at <= ${n}"), SqlParam::Timestamp(*at))
                }
            };
            clauses.push(clause);
            params.push(param);
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if self.projection == Projection::Entries {
            sql.push_str(" ORDER BY created_at DESC, id DESC");
            if let Some(limit) = self.limit {
                let _ = write!(sql, " LIMIT {limit}");
            }
            if let Some(offset) = self.offset.filter(|&o| o > 0) {
                let _ = write!(sql, " OFFSET {offset}");
            }
        }

        (sql, params)
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn quote_table(name: &TableName) -> String {
    match name.schema() {
        Some(schema) => format!("{}.{}", quote_identifier(schema), quote_identifier(name.table())),
        None => quote_identifier(name.table()),
    }
}
