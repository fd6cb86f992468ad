use {
    crate::domain::catalog::EntityMapping,
    crate::domain::entry::OperationType,
    crate::domain::error::AuditError,
    crate::domain::filter::QueryFilter,
    crate::domain::naming::TableName,
    crate::domain::query::{AuditQuery, Predicate},
    chrono::{DateTime, Utc},
    std::collections::BTreeSet,
};

/// Composes predicates onto a select-all query over one audit table.
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    query: AuditQuery,
}

impl FilterBuilder {
    pub fn new(table: TableName) -> Self {
        Self {
            query: AuditQuery::new(table),
        }
    }

    /// Only single-table-inheritance entities share a table, so only they get
    /// the discriminator predicate.
    pub fn discriminator(mut self, mapping: &EntityMapping, strict: bool) -> Self {
        if strict && mapping.is_single_table() {
            self.query
                .predicates
                .push(Predicate::Discriminator(mapping.entity.clone()));
        }
        self
    }

    pub fn object_id(mut self, id: Option<&str>) -> Self {
        if let Some(id) = id {
            self.query.predicates.push(Predicate::ObjectId(id.to_string()));
        }
        self
    }

    pub fn transaction_hash(mut self, hash: Option<&str>) -> Self {
        if let Some(hash) = hash {
            self.query
                .predicates
                .push(Predicate::TransactionHash(hash.to_string()));
        }
        self
    }

    pub fn types(mut self, types: &BTreeSet<OperationType>) -> Self {
        if !types.is_empty() {
            self.query
                .predicates
                .push(Predicate::TypeIn(types.iter().copied().collect()));
        }
        self
    }

    pub fn created_between(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, AuditError> {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                return Err(AuditError::InvalidArgument(format!(
                    "end date {end} is before start date {start}"
                )));
            }
        }
        if let Some(start) = start {
            self.query.predicates.push(Predicate::CreatedFrom(start));
        }
        if let Some(end) = end {
            self.query.predicates.push(Predicate::CreatedUntil(end));
        }
        Ok(self)
    }

    pub fn window(mut self, window: Option<(u64, u64)>) -> Self {
        if let Some((offset, limit)) = window {
            self.query.offset = Some(offset);
            self.query.limit = Some(limit);
        }
        self
    }

    pub fn build(self) -> AuditQuery {
        self.query
    }
}

/// Builds the query for one reader call; validation happens before anything else.
pub fn build_query(
    table: TableName,
    mapping: &EntityMapping,
    filter: &QueryFilter,
    types: &BTreeSet<OperationType>,
) -> Result<AuditQuery, AuditError> {
    let window = filter.window()?;

    let query = FilterBuilder::new(table)
        .discriminator(mapping, filter.strict)
        .object_id(filter.object_id.as_deref())
        .transaction_hash(filter.transaction_hash.as_deref())
        .types(types)
        .created_between(filter.start_date, filter.end_date)?
        .window(window)
        .build();

    Ok(query)
}
