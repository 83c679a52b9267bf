//! The list-view query: filters, sort, and page window.

use serde::Serialize;

/// Newest first.
pub const DEFAULT_SORT: &str = "-created_at";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Marker for descending order in a sort expression.
const DESCENDING: char = '-';

/// Columns the backend accepts as sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Amount,
    CreatedAt,
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Amount => "amount",
            SortColumn::CreatedAt => "created_at",
        }
    }

    pub fn parse(s: &str) -> Option<SortColumn> {
        match s.trim().trim_start_matches(DESCENDING) {
            "amount" => Some(SortColumn::Amount),
            "created_at" | "created-at" | "date" => Some(SortColumn::CreatedAt),
            _ => None,
        }
    }
}

/// Complete description of which page of which list is wanted.
///
/// Built fresh on every interaction. Changing `id`, `status` or `sort`
/// returns to the first page; paging keeps the filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub sort: String,
    pub limit: u32,
    pub offset: u32,
}

impl Default for PaymentQuery {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl PaymentQuery {
    /// A zero page size is bumped to one so `offset` stays a multiple of `limit`.
    pub fn with_page_size(limit: u32) -> Self {
        Self {
            id: None,
            status: None,
            sort: DEFAULT_SORT.to_string(),
            limit: limit.max(1),
            offset: 0,
        }
    }

    /// Exact-match identifier filter. Blank input clears it.
    pub fn searching(&self, text: &str) -> Self {
        let id = Some(text.trim()).filter(|t| !t.is_empty()).map(str::to_string);
        Self {
            id,
            offset: 0,
            ..self.clone()
        }
    }

    pub fn filtered_by_status(&self, status: Option<String>) -> Self {
        Self {
            status: status.filter(|s| !s.is_empty()),
            offset: 0,
            ..self.clone()
        }
    }

    /// Switch between sorting by `column` and the default sort.
    pub fn toggled_sort(&self, column: SortColumn) -> Self {
        let sort = if self.sort == column.as_str() {
            DEFAULT_SORT.to_string()
        } else {
            column.as_str().to_string()
        };
        Self {
            sort,
            offset: 0,
            ..self.clone()
        }
    }

    /// Zero-based page. Pages past the representable range land on the
    /// last one, keeping `offset` a multiple of `limit`.
    pub fn at_page(&self, page_index: u32) -> Self {
        let offset = page_index
            .checked_mul(self.limit)
            .unwrap_or((u32::MAX / self.limit) * self.limit);
        Self {
            offset,
            ..self.clone()
        }
    }

    pub fn page_index(&self) -> u32 {
        self.offset / self.limit
    }

    pub fn sort_column(&self) -> Option<SortColumn> {
        SortColumn::parse(&self.sort)
    }

    pub fn is_descending(&self) -> bool {
        self.sort.starts_with(DESCENDING)
    }

    /// Query-string pairs, omitting unset filters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(5);
        if let Some(id) = &self.id {
            params.push(("id".to_string(), id.clone()));
        }
        if let Some(status) = &self.status {
            params.push(("status".to_string(), status.clone()));
        }
        params.push(("sort".to_string(), self.sort.clone()));
        params.push(("limit".to_string(), self.limit.to_string()));
        params.push(("offset".to_string(), self.offset.to_string()));
        params
    }
}

/// Pages needed to show `total` items.
pub fn page_count(total: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    u32::try_from(total.div_ceil(limit)).unwrap_or(u32::MAX)
}
