//! Category update endpoint.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    auth::Claims,
    category::{Category, CategoryID, CategoryPatch, create::CategoryState, domain::CategoryPatchData},
    crud::{Scope, lock_connection, update_resource},
};

/// Handle a partial update of a category. Fields left out of the body keep
/// their current values.
pub async fn update_category_endpoint(
    _claims: Claims,
    State(state): State<CategoryState>,
    Path(category_id): Path<CategoryID>,
    Json(data): Json<CategoryPatchData>,
) -> Result<Json<Category>, Error> {
    let patch = CategoryPatch::try_from(data)?;
    let connection = lock_connection(&state.db_connection)?;

    update_resource(category_id, &patch, Scope::All, &connection).map(Json)
}

#[cfg(test)]
mod update_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Path, State},
    };
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{
            Category, CategoryName, NewCategory, create::CategoryState, create_category_table,
            domain::CategoryPatchData, update_category_endpoint,
        },
        crud::create_resource,
        test_utils::test_claims,
    };

    fn get_state_with_category() -> (CategoryState, Category) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_category_table(&connection).expect("Could not create category table");
        let category = create_resource(
            &NewCategory {
                name: CategoryName::new_unchecked("Food"),
                icon: "🍔".to_owned(),
            },
            &connection,
        )
        .expect("Could not create test category");

        let state = CategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, category)
    }

    #[tokio::test]
    async fn update_icon_only() {
        let (state, category) = get_state_with_category();
        let data = CategoryPatchData {
            name: None,
            icon: Some("🍕".to_owned()),
        };

        let Json(updated) =
            update_category_endpoint(test_claims(1), State(state), Path(category.id), Json(data))
                .await
                .expect("Could not update category");

        assert_eq!(updated.id, category.id);
        assert_eq!(updated.name, category.name);
        assert_eq!(updated.icon, "🍕");
    }

    #[tokio::test]
    async fn update_missing_category_returns_not_found() {
        let (state, category) = get_state_with_category();

        let result = update_category_endpoint(
            test_claims(1),
            State(state),
            Path(category.id + 1),
            Json(CategoryPatchData::default()),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
