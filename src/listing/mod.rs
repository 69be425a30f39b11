//! The list contract shared by every resource.
//!
//! A list request carries three independent directives: which page to return
//! ([pagination]), what order to return items in ([sorting]) and which items
//! to include ([filtering]). Each is resolved from untrusted query parameters
//! against the resource's allow-listed [Field]s, then [query] combines them
//! into parameterised SQL.

pub mod field;
pub mod filtering;
pub mod page;
pub mod pagination;
pub mod params;
pub mod query;
pub mod sorting;

pub use field::{Field, FieldKind, SqlValue};
pub use page::PaginatedResource;
pub use pagination::PaginationConfig;
pub use params::ListParams;
pub use query::Predicate;
