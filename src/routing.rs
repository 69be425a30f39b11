//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState, Error,
    auth::{log_in_endpoint, refresh_endpoint},
    category::{Category, create_category_endpoint, update_category_endpoint},
    crud::{delete_resource_endpoint, get_resource_endpoint, list_resources_endpoint},
    endpoints,
    logging::logging_middleware,
    transaction::{Transaction, create_transaction_endpoint, update_transaction_endpoint},
    user::{User, register_user_endpoint, update_user_endpoint},
};

/// Return a router with all the app's routes.
///
/// Every route except registration and the log-in routes requires a bearer
/// access token, which is checked by the `Claims` extractor in each handler.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::REFRESH, post(refresh_endpoint));

    let user_routes = Router::new()
        .route(
            endpoints::USERS,
            post(register_user_endpoint).get(list_resources_endpoint::<User>),
        )
        .route(
            endpoints::USER,
            get(get_resource_endpoint::<User>)
                .patch(update_user_endpoint)
                .delete(delete_resource_endpoint::<User>),
        );

    let category_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            post(create_category_endpoint).get(list_resources_endpoint::<Category>),
        )
        .route(
            endpoints::CATEGORY,
            get(get_resource_endpoint::<Category>)
                .patch(update_category_endpoint)
                .delete(delete_resource_endpoint::<Category>),
        );

    let transaction_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction_endpoint).get(list_resources_endpoint::<Transaction>),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_resource_endpoint::<Transaction>)
                .patch(update_transaction_endpoint)
                .delete(delete_resource_endpoint::<Transaction>),
        );

    auth_routes
        .merge(user_routes)
        .merge(category_routes)
        .merge(transaction_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
