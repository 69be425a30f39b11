//! The generic resource service shared by every resource.
//!
//! A type implements [Resource] to describe its table and field map, and in
//! return gets create, list, get, update and soft-delete through [store] and
//! the list, get and delete endpoints in [handlers].

pub mod handlers;
pub mod resource;
pub mod store;

pub use handlers::{
    delete_resource_endpoint, get_resource_endpoint, list_resources_endpoint, lock_connection,
};
pub use resource::{DatabaseID, Resource, Scope};
pub use store::{create_resource, find_resource, get_resource, update_resource};
