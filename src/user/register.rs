//! The endpoint for registering a new user.

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
    crud::{create_resource, lock_connection},
    endpoints::{self, format_endpoint},
    user::{NewUser, RegisterData, User},
};

/// The state needed for registering and editing users.
#[derive(Debug, Clone)]
pub struct UserState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// Register a new user. This endpoint does not require authentication.
///
/// Responds with `201 Created` and the new user, or `409 Conflict` if an
/// active user already has the email address.
pub async fn register_user_endpoint(
    State(state): State<UserState>,
    Json(data): Json<RegisterData>,
) -> Result<Response, Error> {
    let new_user = NewUser::from_registration(data, state.password_cost)?;
    let connection = lock_connection(&state.db_connection)?;

    let user: User = create_resource(&new_user, &connection)?;
    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        [(LOCATION, format_endpoint(endpoints::USER, user.id.as_i64()))],
        Json(user),
    )
        .into_response())
}

#[cfg(test)]
mod register_user_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::test_utils::get_test_app_state;

    use super::register_user_endpoint;

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route("/users", post(register_user_endpoint))
            .with_state(get_test_app_state());

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn register_user_succeeds() {
        let server = get_test_server();

        let response = server
            .post("/users")
            .json(&json!({
                "email": "foo@bar.baz",
                "name": "Foo",
                "password": "averysafeandsecurepassword",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.header("location"), "/api/users/1");
        let user = response.json::<Value>();
        assert_eq!(user["email"], "foo@bar.baz");
        assert_eq!(user["name"], "Foo");
        assert!(user.get("password").is_none());
        assert!(user.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn register_user_fails_with_duplicate_email() {
        let server = get_test_server();
        let body = json!({
            "email": "foo@bar.baz",
            "password": "averysafeandsecurepassword",
        });
        server
            .post("/users")
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/users")
            .json(&body)
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_user_fails_with_invalid_email() {
        let server = get_test_server();

        server
            .post("/users")
            .json(&json!({
                "email": "foo",
                "password": "averysafeandsecurepassword",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_user_fails_with_weak_password() {
        let server = get_test_server();

        server
            .post("/users")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "hunter2",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
