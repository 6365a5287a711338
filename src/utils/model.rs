use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Common `?page=&limit=` query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 50;

impl PageQuery {
    /// Clamp raw query values into a usable (page, limit) pair.
    /// Page is 1-based; limit is bounded to 1..=MAX_PAGE_LIMIT.
    pub fn resolve(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        (page, limit)
    }

    pub fn skip(&self) -> u64 {
        let (page, limit) = self.resolve();
        (page - 1) * limit
    }
}

/// Paginated response body shared by the list endpoints
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, query: &PageQuery, total: u64) -> Self {
        let (page, limit) = query.resolve();
        Self {
            data,
            page,
            limit,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults() {
        let q = PageQuery {
            page: None,
            limit: None,
        };
        assert_eq!(q.resolve(), (1, DEFAULT_PAGE_LIMIT));
        assert_eq!(q.skip(), 0);
    }

    #[test]
    fn limit_is_clamped() {
        let q = PageQuery {
            page: Some(3),
            limit: Some(500),
        };
        assert_eq!(q.resolve(), (3, MAX_PAGE_LIMIT));
        assert_eq!(q.skip(), 2 * MAX_PAGE_LIMIT);

        let q = PageQuery {
            page: Some(0),
            limit: Some(0),
        };
        assert_eq!(q.resolve(), (1, 1));
    }
}
