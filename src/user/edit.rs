//! The endpoint for updating a user's account.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    auth::Claims,
    crud::{DatabaseID, Scope, lock_connection, update_resource},
    user::{User, UserPatch, UserPatchData, register::UserState},
};

/// Handle a partial update of the authenticated user's account.
///
/// A user can only update their own account, any other ID is not found.
pub async fn update_user_endpoint(
    claims: Claims,
    State(state): State<UserState>,
    Path(user_id): Path<DatabaseID>,
    Json(data): Json<UserPatchData>,
) -> Result<Json<User>, Error> {
    let patch = UserPatch::from_data(data, state.password_cost)?;
    let connection = lock_connection(&state.db_connection)?;
    let scope = Scope::for_user::<User>(claims.user_id());

    update_resource(user_id, &patch, scope, &connection).map(Json)
}

#[cfg(test)]
mod update_user_endpoint_tests {
    use axum::{
        Json,
        extract::{FromRef, Path, State},
    };

    use crate::{
        Error,
        test_utils::{create_test_user, get_test_app_state, test_claims},
        user::{UserPatchData, register::UserState},
    };

    use super::update_user_endpoint;

    #[tokio::test]
    async fn user_can_rename_themselves() {
        let app_state = get_test_app_state();
        let user = create_test_user(&app_state, "foo@bar.baz", "averysafeandsecurepassword");
        let data = UserPatchData {
            name: Some("Bar".to_owned()),
            ..Default::default()
        };

        let Json(updated) = update_user_endpoint(
            test_claims(user.id.as_i64()),
            State(UserState::from_ref(&app_state)),
            Path(user.id.as_i64()),
            Json(data),
        )
        .await
        .expect("Could not update user");

        assert_eq!(updated.name, "Bar");
        assert_eq!(updated.email, user.email);
        assert_eq!(updated.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn changing_password_rehashes() {
        let app_state = get_test_app_state();
        let user = create_test_user(&app_state, "foo@bar.baz", "averysafeandsecurepassword");
        let data = UserPatchData {
            password: Some("anotherquitesecurepassphrase".to_owned()),
            ..Default::default()
        };

        let Json(updated) = update_user_endpoint(
            test_claims(user.id.as_i64()),
            State(UserState::from_ref(&app_state)),
            Path(user.id.as_i64()),
            Json(data),
        )
        .await
        .expect("Could not update user");

        assert!(
            updated
                .password_hash
                .verify("anotherquitesecurepassphrase")
                .unwrap()
        );
    }

    #[tokio::test]
    async fn user_cannot_update_another_user() {
        let app_state = get_test_app_state();
        let foo = create_test_user(&app_state, "foo@bar.baz", "averysafeandsecurepassword");
        let bar = create_test_user(&app_state, "bar@bar.baz", "averysafeandsecurepassword");
        let data = UserPatchData {
            name: Some("Hacked".to_owned()),
            ..Default::default()
        };

        let result = update_user_endpoint(
            test_claims(foo.id.as_i64()),
            State(UserState::from_ref(&app_state)),
            Path(bar.id.as_i64()),
            Json(data),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
