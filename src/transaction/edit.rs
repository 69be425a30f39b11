//! Defines the endpoint for updating a transaction.

use axum::{
    Json,
    extract::{Path, State},
};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::Claims,
    crud::{Scope, lock_connection, update_resource},
    transaction::{
        Transaction, TransactionID, TransactionPatch, TransactionPatchData,
        create::TransactionState, db::check_category,
    },
};

/// A route handler for partially updating one of the authenticated user's
/// transactions.
///
/// Transactions owned by other users are reported as not found.
pub async fn update_transaction_endpoint(
    claims: Claims,
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionID>,
    Json(data): Json<TransactionPatchData>,
) -> Result<Json<Transaction>, Error> {
    let today = OffsetDateTime::now_utc().date();
    let patch = TransactionPatch::new(data, today)?;
    let connection = lock_connection(&state.db_connection)?;

    if let Some(Some(category_id)) = patch.category_id {
        check_category(category_id, &connection)?;
    }

    let scope = Scope::for_user::<Transaction>(claims.user_id());

    update_resource(transaction_id, &patch, scope, &connection).map(Json)
}

#[cfg(test)]
mod update_transaction_endpoint_tests {
    use axum::{
        Json,
        extract::{FromRef, Path, State},
    };
    use time::macros::date;

    use crate::{
        AppState, Error,
        crud::create_resource,
        test_utils::{get_test_app_state, test_claims},
        transaction::{
            NewTransaction, Transaction, TransactionPatchData, create::TransactionState,
        },
        user::UserID,
    };

    use super::update_transaction_endpoint;

    fn insert_transaction(state: &AppState, user_id: i64) -> Transaction {
        let connection = state.db_connection.lock().unwrap();

        create_resource(
            &NewTransaction {
                user_id: UserID::new(user_id),
                category_id: None,
                amount: 10.0,
                date: date!(2025 - 06 - 01),
                description: "Books".to_owned(),
            },
            &connection,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn can_update_amount() {
        let state = get_test_app_state();
        let transaction = insert_transaction(&state, 1);
        let data = TransactionPatchData {
            amount: Some(20.0),
            ..Default::default()
        };

        let Json(updated) = update_transaction_endpoint(
            test_claims(1),
            State(TransactionState::from_ref(&state)),
            Path(transaction.id),
            Json(data),
        )
        .await
        .expect("Could not update transaction");

        assert_eq!(updated.amount, 20.0);
        assert_eq!(updated.description, "Books");
        assert_eq!(updated.date, transaction.date);
    }

    #[tokio::test]
    async fn cannot_update_another_users_transaction() {
        let state = get_test_app_state();
        let transaction = insert_transaction(&state, 1);
        let data = TransactionPatchData {
            description: Some("Hacked".to_owned()),
            ..Default::default()
        };

        let result = update_transaction_endpoint(
            test_claims(2),
            State(TransactionState::from_ref(&state)),
            Path(transaction.id),
            Json(data),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn update_fails_on_unknown_category() {
        let state = get_test_app_state();
        let transaction = insert_transaction(&state, 1);
        let data = TransactionPatchData {
            category_id: Some(Some(99)),
            ..Default::default()
        };

        let result = update_transaction_endpoint(
            test_claims(1),
            State(TransactionState::from_ref(&state)),
            Path(transaction.id),
            Json(data),
        )
        .await;

        assert_eq!(result.err(), Some(Error::InvalidCategory(99)));
    }

    #[tokio::test]
    async fn update_fails_on_non_finite_amount() {
        let state = get_test_app_state();
        let transaction = insert_transaction(&state, 1);
        let data = TransactionPatchData {
            amount: Some(f64::NEG_INFINITY),
            ..Default::default()
        };

        let result = update_transaction_endpoint(
            test_claims(1),
            State(TransactionState::from_ref(&state)),
            Path(transaction.id),
            Json(data),
        )
        .await;

        assert_eq!(result.err(), Some(Error::InvalidAmount));
    }
}
