use {
    crate::domain::entry::{AuditEntry, Blame, OperationType},
    crate::domain::error::AuditError,
    crate::domain::query::{AuditQuery, SqlParam},
    crate::domain::store::{AuditStore, StoreFuture},
    chrono::NaiveDateTime,
    sqlx::{Arguments, PgPool, postgres::PgArguments},
};

#[derive(Debug, sqlx::FromRow)]
struct AuditEntryRow {
    id: i32,
    #[sqlx(rename = "type")]
    operation: String,
    object_id: Option<String>,
    discriminator: Option<String>,
    transaction_hash: Option<String>,
    diffs: Option<serde_json::Value>,
    blame_id: Option<String>,
    blame_user: Option<String>,
    blame_user_fqdn: Option<String>,
    blame_user_firewall: Option<String>,
    ip: Option<String>,
    created_at: NaiveDateTime,
}

impl TryFrom<AuditEntryRow> for AuditEntry {
    type Error = AuditError;

    fn try_from(row: AuditEntryRow) -> Result<Self, Self::Error> {
        let operation = OperationType::try_from(row.operation.as_str())
            .map_err(|e| AuditError::Store(format!("audit row {}: {e}", row.id)))?;

        Ok(AuditEntry {
            id: i64::from(row.id),
            operation,
            object_id: row.object_id,
            discriminator: row.discriminator,
            transaction_hash: row.transaction_hash,
            diffs: row.diffs,
            blame: Blame {
                id: row.blame_id,
                user: row.blame_user,
                user_fqdn: row.blame_user_fqdn,
                user_firewall: row.blame_user_firewall,
            },
            ip: row.ip,
            created_at: row.created_at.and_utc(),
        })
    }
}

/// Reader queries over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_entries_inner(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, AuditError> {
        let (sql, params) = query.to_sql();
        let rows: Vec<AuditEntryRow> = sqlx::query_as_with(&sql, bind_all(params)?)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }

    async fn fetch_count_inner(&self, query: &AuditQuery) -> Result<Option<i64>, AuditError> {
        let (sql, params) = query.to_sql();
        let count: Option<Option<i64>> = sqlx::query_scalar_with(&sql, bind_all(params)?)
            .fetch_optional(&self.pool)
            .await?;
        Ok(count.flatten())
    }
}

fn bind_all(params: Vec<SqlParam>) -> Result<PgArguments, AuditError> {
    let mut args = PgArguments::default();
    for param in params {
        let added = match param {
            SqlParam::Text(v) => args.add(v),
            SqlParam::TextList(v) => args.add(v),
            SqlParam::Timestamp(at) => args.add(at.naive_utc()),
        };
        added.map_err(|e| AuditError::Store(format!("binding query parameter: {e}")))?;
    }
    Ok(args)
}

impl AuditStore for PgAuditStore {
    fn fetch_entries<'a>(&'a self, query: &'a AuditQuery) -> StoreFuture<'a, Vec<AuditEntry>> {
        Box::pin(async move { self.fetch_entries_inner(query).await })
    }

    fn fetch_count<'a>(&'a self, query: &'a AuditQuery) -> StoreFuture<'a, Option<i64>> {
        Box::pin(async move { self.fetch_count_inner(query).await })
    }
}
