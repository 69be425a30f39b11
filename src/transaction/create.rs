//! Defines the endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::Claims,
    crud::{create_resource, lock_connection},
    endpoints::{self, format_endpoint},
    transaction::{NewTransaction, Transaction, TransactionData, db::check_category},
};

/// The state needed for creating or editing a transaction.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction for the authenticated user.
///
/// Responds with `201 Created` and the new transaction.
pub async fn create_transaction_endpoint(
    claims: Claims,
    State(state): State<TransactionState>,
    Json(data): Json<TransactionData>,
) -> Result<Response, Error> {
    let today = OffsetDateTime::now_utc().date();
    let new_transaction = NewTransaction::new(claims.user_id(), data, today)?;
    let connection = lock_connection(&state.db_connection)?;

    if let Some(category_id) = new_transaction.category_id {
        check_category(category_id, &connection)?;
    }

    let transaction: Transaction = create_resource(&new_transaction, &connection)?;

    Ok((
        StatusCode::CREATED,
        [(
            LOCATION,
            format_endpoint(endpoints::TRANSACTION, transaction.id),
        )],
        Json(transaction),
    )
        .into_response())
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use time::{Duration, OffsetDateTime};

    use crate::{
        AppState,
        category::{Category, CategoryName, NewCategory},
        crud::create_resource,
        test_utils::{create_test_user, get_test_app_state},
        user::User,
    };

    use super::create_transaction_endpoint;

    fn get_test_server() -> (TestServer, AppState, User) {
        let state = get_test_app_state();
        let user = create_test_user(&state, "foo@bar.baz", "averysafeandsecurepassword");
        let app = Router::new()
            .route("/transactions", post(create_transaction_endpoint))
            .with_state(state.clone());
        let server = TestServer::new(app).expect("Could not create test server.");

        (server, state, user)
    }

    fn access_token(state: &AppState, user: &User) -> String {
        state.jwt_config.issue(user.id).unwrap().access_token
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (server, state, user) = get_test_server();

        let response = server
            .post("/transactions")
            .authorization_bearer(access_token(&state, &user))
            .json(&json!({
                "amount": -12.5,
                "date": "2025-01-31",
                "description": "Lunch",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.header("location"), "/api/transactions/1");
        let transaction = response.json::<Value>();
        assert_eq!(transaction["amount"], -12.5);
        assert_eq!(transaction["date"], "2025-01-31");
        assert_eq!(transaction["description"], "Lunch");
        assert_eq!(transaction["user_id"], user.id.as_i64());
        assert_eq!(transaction["category_id"], Value::Null);
    }

    #[tokio::test]
    async fn create_fails_without_token() {
        let (server, _, _) = get_test_server();

        server
            .post("/transactions")
            .json(&json!({ "amount": 1.0, "date": "2025-01-31" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_fails_on_future_date() {
        let (server, state, user) = get_test_server();
        let future_date = OffsetDateTime::now_utc().date() + Duration::days(2);

        server
            .post("/transactions")
            .authorization_bearer(access_token(&state, &user))
            .json(&json!({ "amount": 1.0, "date": future_date.to_string() }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_fails_on_unknown_category() {
        let (server, state, user) = get_test_server();

        let response = server
            .post("/transactions")
            .authorization_bearer(access_token(&state, &user))
            .json(&json!({ "amount": 1.0, "date": "2025-01-31", "category_id": 42 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("42"));
    }

    #[tokio::test]
    async fn create_with_category_succeeds() {
        let (server, state, user) = get_test_server();
        let category_id = {
            let connection = state.db_connection.lock().unwrap();
            create_resource::<Category>(
                &NewCategory {
                    name: CategoryName::new_unchecked("Food"),
                    icon: String::new(),
                },
                &connection,
            )
            .unwrap()
            .id
        };

        let response = server
            .post("/transactions")
            .authorization_bearer(access_token(&state, &user))
            .json(&json!({ "amount": 1.0, "date": "2025-01-31", "category_id": category_id }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["category_id"], category_id);
    }
}
