//! Offset pagination shared by admin listings.

use serde::Serialize;
use utoipa::ToSchema;

/// Default page size when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// One-based page selector.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= MAX_PAGE_SIZE`
///
/// # Examples
/// ```
/// use institute::domain::PageRequest;
///
/// let request = PageRequest::new(Some(0), Some(500));
/// assert_eq!(request.page(), 1);
/// assert_eq!(request.limit(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Clamp raw query values into a valid request.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// One-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A page of items plus the total size of the filtered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    /// Number of pages needed to show `total_items`.
    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(u64::from(self.request.limit()))
    }

    /// Summary block rendered alongside list responses.
    pub fn pagination(&self) -> Pagination {
        Pagination {
            current_page: self.request.page(),
            total_pages: self.total_pages(),
            total_items: self.total_items,
            limit: self.request.limit(),
        }
    }

    /// Transform the items while keeping the counters.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            request: self.request,
        }
    }
}

/// Pagination summary serialised in list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub limit: u32,
}

/// Slice an in-memory collection according to `request`.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total_items = items.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let limit = request.limit() as usize;
    Page {
        items: items.into_iter().skip(offset).take(limit).collect(),
        total_items,
        request,
    }
}
