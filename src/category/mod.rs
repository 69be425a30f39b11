//! Category management for grouping transactions.

mod create;
mod db;
mod domain;
mod edit;

pub use create::create_category_endpoint;
pub use db::create_category_table;
pub use domain::{Category, CategoryID, CategoryName, CategoryPatch, NewCategory};
pub use edit::update_category_endpoint;
