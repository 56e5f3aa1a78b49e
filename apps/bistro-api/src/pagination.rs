//! List query parameters and the paginated response envelope.
//!
//! ```json
//! { "data": [...], "meta": { "page": 1, "limit": 15, "total": 42, "last_page": 3 } }
//! ```

use serde::{Deserialize, Serialize};

use bistro_db::{Page, PageRequest};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest::new(query.page, query.limit)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub last_page: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> From<Page<T>> for Paginated<T> {
    fn from(page: Page<T>) -> Self {
        let meta = PageMeta {
            page: page.request.page,
            limit: page.request.limit,
            total: page.total,
            last_page: page.last_page(),
        };
        Paginated { data: page.items, meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope() {
        let page = Page {
            items: vec![1, 2],
            total: 32,
            request: PageRequest::new(Some(3), Some(15)),
        };
        let json = serde_json::to_value(Paginated::from(page)).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["meta"]["page"], 3);
        assert_eq!(json["meta"]["last_page"], 3);
    }

    #[test]
    fn test_query_is_clamped() {
        let request: PageRequest = PageQuery {
            page: Some(0),
            limit: Some(1000),
        }
        .into();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 100);
    }
}
