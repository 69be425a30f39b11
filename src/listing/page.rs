//! The envelope returned by list endpoints.

use serde::Serialize;

/// One page of a resource's items.
///
/// `total` counts every item that matched the request's filters, ignoring
/// pagination, so `items.len() <= size` while `total` may be larger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginatedResource<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}
