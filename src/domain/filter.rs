use {
    super::error::AuditError,
    chrono::{DateTime, Utc},
};

/// Request-scoped selection criteria for one reader call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub object_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub transaction_hash: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Adds a discriminator predicate for single-table-inheritance entities.
    pub strict: bool,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            object_id: None,
            page: None,
            page_size: None,
            transaction_hash: None,
            start_date: None,
            end_date: None,
            strict: true,
        }
    }
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_id(mut self, id: impl ToString) -> Self {
        self.object_id = Some(id.to_string());
        self
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn transaction_hash(mut self, hash: impl Into<String>) -> Self {
        self.transaction_hash = Some(hash.into());
        self
    }

    pub fn between(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Offset and limit for the requested page, if paging was asked for.
    /// A page size without a page number means the first page.
    pub fn window(&self) -> Result<Option<(u64, u64)>, AuditError> {
        self.validate()?;
        Ok(self.page_size.map(|size| {
            let page = self.page.unwrap_or(1);
            (u64::from(page - 1) * u64::from(size), u64::from(size))
        }))
    }

    /// Rejects caller-input bugs before anything reaches the store.
    pub fn validate(&self) -> Result<(), AuditError> {
        if matches!(self.page, Some(p) if p < 1) {
            return Err(AuditError::InvalidArgument(
                "page must be greater or equal than 1".into(),
            ));
        }
        if matches!(self.page_size, Some(s) if s < 1) {
            return Err(AuditError::InvalidArgument(
                "page size must be greater or equal than 1".into(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(AuditError::InvalidArgument(format!(
                    "end date {end} is before start date {start}"
                )));
            }
        }
        Ok(())
    }
}
