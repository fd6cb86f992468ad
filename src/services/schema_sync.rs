use {
    super::schema_differ::SchemaDiffer,
    crate::domain::catalog::{EntityCatalog, auditable_entities},
    crate::domain::error::AuditError,
    crate::domain::naming::TableNamer,
    crate::domain::policy::AuditabilityPolicy,
    crate::domain::schema::Schema,
    crate::domain::store::SchemaStore,
    std::collections::BTreeSet,
    std::sync::Arc,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub total: usize,
    /// 1-based position of the statement just attempted.
    pub current: usize,
}

/// Statements plus the audit schema they lead to.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub statements: Vec<String>,
    pub target: Schema,
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<(String, AuditError)>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Brings every audited entity's shadow table in line with the
/// [`AuditTableSpec`](crate::domain::schema::AuditTableSpec) shape.
///
/// Runs are not coordinated with each other; callers serialize them.
pub struct SchemaSyncManager {
    source: Arc<dyn SchemaStore>,
    audit: Arc<dyn SchemaStore>,
    catalog: Arc<dyn EntityCatalog>,
    policy: Arc<dyn AuditabilityPolicy>,
    namer: TableNamer,
    differ: SchemaDiffer,
}

impl SchemaSyncManager {
    /// `source` holds the live entity tables, `audit` the shadow tables; both
    /// may point at the same database.
    pub fn new(
        source: Arc<dyn SchemaStore>,
        audit: Arc<dyn SchemaStore>,
        catalog: Arc<dyn EntityCatalog>,
        policy: Arc<dyn AuditabilityPolicy>,
        namer: TableNamer,
        differ: SchemaDiffer,
    ) -> Self {
        Self {
            source,
            audit,
            catalog,
            policy,
            namer,
            differ,
        }
    }

    pub async fn compute_migration(&self) -> Result<MigrationPlan, AuditError> {
        tracing::debug!("snapshotting schemas");
        let live = self.source.current_schema().await?;
        let original = self.audit.current_schema().await?;

        tracing::debug!("planning audit schema");
        let audited: BTreeSet<_> =
            auditable_entities(&*self.catalog, &*self.policy, &self.namer)
                .into_values()
                .collect();

        let mut target = original.clone();
        for table in live.tables().filter(|t| audited.contains(&t.name)) {
            let audit_name = self.namer.audit_table(&table.name);
            if audit_name == table.name {
                tracing::warn!(table = %audit_name, "audit table name equals live table name, skipping");
                continue;
            }
            let planned = match original.table(&audit_name) {
                Some(existing) => {
                    tracing::debug!(table = %audit_name, "updating audit table");
                    self.differ.update_table(existing)
                }
                None => {
                    tracing::debug!(table = %audit_name, "creating audit table");
                    self.differ.plan_for_new_table(audit_name)
                }
            };
            target.add_table(planned);
        }

        let statements = self.audit.migrate_sql(&original, &target);
        tracing::info!(count = statements.len(), "audit schema planned");
        Ok(MigrationPlan { statements, target })
    }

    pub async fn compute_migration_statements(&self) -> Result<Vec<String>, AuditError> {
        Ok(self.compute_migration().await?.statements)
    }

    /// Best effort: each statement runs on its own and a failure never stops
    /// the rest. Failures are returned in the report.
    pub async fn apply(
        &self,
        statements: &[String],
        mut on_progress: Option<&mut (dyn FnMut(Progress) + Send)>,
    ) -> ApplyReport {
        let total = statements.len();
        let mut report = ApplyReport {
            total,
            ..ApplyReport::default()
        };

        tracing::info!(total, "applying audit schema statements");
        for (index, statement) in statements.iter().enumerate() {
            match self.audit.execute(statement).await {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    tracing::warn!(statement = %statement, error = %e, "audit schema statement failed");
                    report.failures.push((
                        statement.clone(),
                        AuditError::SchemaOperation {
                            statement: statement.clone(),
                            message: e.to_string(),
                        },
                    ));
                }
            }
            if let Some(callback) = on_progress.as_deref_mut() {
                callback(Progress {
                    total,
                    current: index + 1,
                });
            }
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failures.len(),
            "audit schema sync done"
        );
        report
    }

    /// Computes and applies in one go.
    pub async fn sync(
        &self,
        on_progress: Option<&mut (dyn FnMut(Progress) + Send)>,
    ) -> Result<ApplyReport, AuditError> {
        let statements = self.compute_migration_statements().await?;
        Ok(self.apply(&statements, on_progress).await)
    }
}
