//! The list, get and delete endpoints, which are the same for every resource.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use axum_extra::extract::Query;
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::Claims,
    crud::{
        resource::{DatabaseID, Resource, Scope},
        store::{get_resource, list_resources, remove_resource},
    },
    listing::{ListParams, PaginatedResource, PaginationConfig},
};

/// The state needed by the generic resource endpoints.
#[derive(Debug, Clone)]
pub struct ResourceState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ResourceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Acquire the database lock.
///
/// # Errors
///
/// Returns an [Error::DatabaseLockError] if the lock is poisoned.
pub fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

/// List one page of a resource, e.g. `GET /api/categories?page=2&sort=name:DESC`.
pub async fn list_resources_endpoint<R>(
    claims: Claims,
    State(state): State<ResourceState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PaginatedResource<R>>, Error>
where
    R: Resource + Serialize + Send + 'static,
{
    let connection = lock_connection(&state.db_connection)?;
    let scope = Scope::for_user::<R>(claims.user_id());

    list_resources::<R>(&params, &state.pagination_config, scope, &connection).map(Json)
}

/// Get a single active resource by its ID.
pub async fn get_resource_endpoint<R>(
    claims: Claims,
    State(state): State<ResourceState>,
    Path(id): Path<DatabaseID>,
) -> Result<Json<R>, Error>
where
    R: Resource + Serialize + Send + 'static,
{
    let connection = lock_connection(&state.db_connection)?;
    let scope = Scope::for_user::<R>(claims.user_id());

    get_resource::<R>(id, scope, &connection).map(Json)
}

/// Soft-delete a resource by its ID.
///
/// Deleting a resource that was already deleted also returns
/// `204 No Content`.
pub async fn delete_resource_endpoint<R>(
    claims: Claims,
    State(state): State<ResourceState>,
    Path(id): Path<DatabaseID>,
) -> Result<StatusCode, Error>
where
    R: Resource + Send + 'static,
{
    let connection = lock_connection(&state.db_connection)?;
    let scope = Scope::for_user::<R>(claims.user_id());

    remove_resource::<R>(id, scope, &connection)?;
    tracing::info!("Removed {} {id}", R::NAME);

    Ok(StatusCode::NO_CONTENT)
}
