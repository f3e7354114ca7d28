use serde::Serialize;

pub const PAGE_SIZE: u64 = 10;

/// Highest page whose offset still fits a signed 64-bit SQL parameter.
pub const MAX_PAGE: u64 = i64::MAX as u64 / PAGE_SIZE;

/// A 1-based page over a listing ordered newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(u64);

impl PageRequest {
    pub fn parse(page: Option<u64>) -> Result<PageRequest, String> {
        match page {
            None => Ok(Self(1)),
            Some(0) => Err("page must be 1 or greater".to_string()),
            Some(page) if page > MAX_PAGE => Err(format!("page must be at most {}", MAX_PAGE)),
            Some(page) => Ok(Self(page)),
        }
    }

    pub fn number(&self) -> u64 {
        self.0
    }

    pub fn offset(&self) -> u64 {
        (self.0 - 1) * PAGE_SIZE
    }

    pub fn limit(&self) -> u64 {
        PAGE_SIZE
    }
}

/// One page of records plus the size of the whole listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total)
    }
}

pub fn total_pages(total: u64) -> u64 {
    (total + PAGE_SIZE - 1) / PAGE_SIZE
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedRequests<T> {
    pub requests: Vec<T>,
    pub total_pages: u64,
    pub current_page: u64,
}
