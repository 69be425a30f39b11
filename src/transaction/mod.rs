//! Transactions record money that a user has spent or earned.
//!
//! Each transaction belongs to the user that created it and may be assigned
//! to a category.

mod create;
mod db;
mod domain;
mod edit;

pub use create::create_transaction_endpoint;
pub use db::create_transaction_table;
pub use domain::{
    NewTransaction, Transaction, TransactionData, TransactionID, TransactionPatch,
    TransactionPatchData,
};
pub use edit::update_transaction_endpoint;
