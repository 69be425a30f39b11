//! Category creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Claims,
    category::{Category, NewCategory, domain::CategoryData},
    crud::{create_resource, lock_connection},
    endpoints::{self, format_endpoint},
};

/// The state needed for creating or editing a category.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle category creation.
///
/// Responds with `201 Created` and the new category, or `409 Conflict` if an
/// active category already has the name.
pub async fn create_category_endpoint(
    _claims: Claims,
    State(state): State<CategoryState>,
    Json(data): Json<CategoryData>,
) -> Result<Response, Error> {
    let new_category = NewCategory::try_from(data)?;
    let connection = lock_connection(&state.db_connection)?;

    let category: Category = create_resource(&new_category, &connection)?;
    tracing::info!("Created category {} \"{}\"", category.id, category.name);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format_endpoint(endpoints::CATEGORY, category.id))],
        Json(category),
    )
        .into_response())
}
