use {
    super::access::AccessGate,
    super::query_builder::build_query,
    crate::domain::catalog::{EntityCatalog, EntityMapping, auditable_entities},
    crate::domain::entry::{AuditEntry, OperationType},
    crate::domain::error::AuditError,
    crate::domain::filter::QueryFilter,
    crate::domain::naming::{TableName, TableNamer},
    crate::domain::page::PageResult,
    crate::domain::policy::VIEW_SCOPE,
    crate::domain::query::AuditQuery,
    crate::domain::store::AuditStore,
    std::collections::{BTreeMap, BTreeSet},
    std::sync::Arc,
};

/// Entries sharing one transaction hash, grouped by entity, plus the
/// entities skipped because the current user may not view them.
#[derive(Debug, Default)]
pub struct TransactionAudits {
    pub entries: BTreeMap<String, Vec<AuditEntry>>,
    pub denied: Vec<(String, AuditError)>,
}

/// Read side of the audit trail.
///
/// The active type filter is instance state: concurrent logical users must
/// not share one `Reader`.
pub struct Reader {
    store: Arc<dyn AuditStore>,
    catalog: Arc<dyn EntityCatalog>,
    gate: AccessGate,
    namer: TableNamer,
    types: BTreeSet<OperationType>,
}

impl Reader {
    pub fn new(
        store: Arc<dyn AuditStore>,
        catalog: Arc<dyn EntityCatalog>,
        gate: AccessGate,
        namer: TableNamer,
    ) -> Self {
        Self {
            store,
            catalog,
            gate,
            namer,
            types: BTreeSet::new(),
        }
    }

    /// Replaces the active type filter; unknown values are dropped.
    pub fn set_type_filter<I, S>(&mut self, types: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.types = types
            .into_iter()
            .filter_map(|t| OperationType::try_from(t.as_ref()).ok())
            .collect();
        self
    }

    pub fn type_filter(&self) -> &BTreeSet<OperationType> {
        &self.types
    }

    /// Auditable entities mapped to their live table, sorted by entity id.
    pub fn get_entities(&self) -> BTreeMap<String, TableName> {
        auditable_entities(&*self.catalog, self.gate.auditability(), &self.namer)
    }

    pub fn audit_table(&self, entity: &str) -> Result<TableName, AuditError> {
        let mapping = self.mapping(entity)?;
        Ok(self.namer.entity_audit_table(&mapping))
    }

    /// Entries newest first, paged when the filter carries a page size.
    pub async fn list(
        &self,
        entity: &str,
        filter: &QueryFilter,
    ) -> Result<Vec<AuditEntry>, AuditError> {
        let query = self.prepare(entity, filter)?;
        tracing::debug!(entity, table = %query.table, "listing audit entries");
        self.store.fetch_entries(&query).await
    }

    pub async fn count(&self, entity: &str, filter: &QueryFilter) -> Result<u64, AuditError> {
        let query = self.prepare(entity, filter)?.to_count();
        let count = self.store.fetch_count(&query).await?;
        Ok(count.and_then(|c| u64::try_from(c).ok()).unwrap_or(0))
    }

    pub async fn paginate(
        &self,
        entity: &str,
        filter: &QueryFilter,
        page: u32,
        page_size: u32,
    ) -> Result<PageResult, AuditError> {
        let paged = filter.clone().page(page, page_size);
        paged.validate()?;

        let results = self.list(entity, &paged).await?;
        let total = self.count(entity, &paged).await?;
        Ok(PageResult::new(results, total, page, page_size))
    }

    /// Every entry recorded for one object, subject to the active type filter.
    pub async fn get_one(
        &self,
        entity: &str,
        object_id: impl ToString,
    ) -> Result<Vec<AuditEntry>, AuditError> {
        self.list(entity, &QueryFilter::new().object_id(object_id)).await
    }

    /// Entries of one flush across all entities. Access-denied entities are
    /// reported in `denied` instead of failing the call.
    pub async fn list_by_transaction(&self, hash: &str) -> Result<TransactionAudits, AuditError> {
        let filter = QueryFilter::new().transaction_hash(hash);
        let mut audits = TransactionAudits::default();

        for entity in self.get_entities().into_keys() {
            match self.list(&entity, &filter).await {
                Ok(entries) if entries.is_empty() => {}
                Ok(entries) => {
                    audits.entries.insert(entity, entries);
                }
                Err(e) if e.is_access_denied() => {
                    tracing::debug!(entity = %entity, error = %e, "skipping entity");
                    audits.denied.push((entity, e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(audits)
    }

    fn prepare(&self, entity: &str, filter: &QueryFilter) -> Result<AuditQuery, AuditError> {
        filter.validate()?;
        self.gate.check(entity, VIEW_SCOPE)?;

        let mapping = self.mapping(entity)?;
        let table = self.namer.entity_audit_table(&mapping);
        build_query(table, &mapping, filter, &self.types)
    }

    fn mapping(&self, entity: &str) -> Result<EntityMapping, AuditError> {
        self.catalog
            .mapping(entity)
            .ok_or_else(|| AuditError::NotAuditable(entity.to_string()))
    }
}
