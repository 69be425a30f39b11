//! User accounts.

mod db;
mod domain;
mod edit;
mod register;

pub use db::{create_user_table, get_user_by_email};
pub use domain::{Email, NewUser, RegisterData, User, UserID, UserPatch, UserPatchData};
pub use edit::update_user_endpoint;
pub use register::register_user_endpoint;
