use {super::entry::AuditEntry, serde::Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub results: Vec<AuditEntry>,
    pub total: u64,
    pub current_page: u32,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
    pub num_pages: u64,
    pub needs_pagination: bool,
}

impl PageResult {
    /// Callers validate `page >= 1` and `page_size >= 1` beforehand.
    pub fn new(results: Vec<AuditEntry>, total: u64, page: u32, page_size: u32) -> Self {
        let size = u64::from(page_size);
        let has_previous_page = page > 1;
        let has_next_page = u64::from(page) * size < total;

        Self {
            results,
            total,
            current_page: page,
            has_previous_page,
            has_next_page,
            previous_page: has_previous_page.then(|| page - 1),
            next_page: has_next_page.then(|| page + 1),
            num_pages: total.div_ceil(size),
            needs_pagination: total > size,
        }
    }
}
