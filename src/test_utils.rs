#![allow(missing_docs)]

//! Helpers shared by the tests of different modules.

use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState,
    auth::{Claims, JwtConfig, token::TokenKind},
    crud::create_resource,
    listing::PaginationConfig,
    user::{NewUser, RegisterData, User, UserID},
};

/// The lowest cost bcrypt allows, keeps tests that hash passwords fast.
pub(crate) const TEST_PASSWORD_COST: u32 = 4;

pub(crate) fn get_test_jwt_config() -> JwtConfig {
    JwtConfig::new(
        "access secret",
        Duration::minutes(15),
        "refresh secret",
        Duration::days(7),
    )
}

pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(
        connection,
        get_test_jwt_config(),
        PaginationConfig::default(),
    )
    .expect("Could not create app state")
    .with_password_cost(TEST_PASSWORD_COST)
}

pub(crate) fn create_test_user(state: &AppState, email: &str, password: &str) -> User {
    let new_user = NewUser::from_registration(
        RegisterData {
            email: email.to_owned(),
            name: "Test User".to_owned(),
            password: password.to_owned(),
        },
        state.password_cost,
    )
    .expect("Could not validate test user");
    let connection = state.db_connection.lock().unwrap();

    create_resource(&new_user, &connection).expect("Could not create test user")
}

/// Claims for a valid access token, for calling handlers directly.
pub(crate) fn test_claims(user_id: i64) -> Claims {
    let now = OffsetDateTime::now_utc();

    Claims {
        sub: UserID::new(user_id),
        iat: now.unix_timestamp(),
        exp: (now + Duration::minutes(15)).unix_timestamp(),
        kind: TokenKind::Access,
    }
}
