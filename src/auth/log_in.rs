//! The endpoints for logging in and refreshing tokens.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use bcrypt::hash;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::token::{JwtConfig, TokenKind, TokenPair},
    crud::{Scope, get_resource, lock_connection},
    user::{User, UserID, get_user_by_email},
};

/// The state needed for logging in and authenticating requests.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The secrets and lifetimes used to sign tokens.
    pub jwt_config: JwtConfig,
    /// The bcrypt cost passwords are hashed with.
    pub password_cost: u32,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            jwt_config: state.jwt_config.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// The request body for logging in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// The email the user registered with.
    pub email: String,
    /// The plain text password.
    pub password: String,
}

/// The request body for refreshing tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// A refresh token from a previous log in or refresh.
    pub refresh_token: String,
}

/// Handler for log-in requests.
///
/// # Errors
///
/// This function will return an [Error::InvalidCredentials] if the email does
/// not belong to an active user or the password is not correct.
pub async fn log_in_endpoint(
    State(state): State<AuthState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenPair>, Error> {
    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_email(&credentials.email, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::NotFound | Error::InvalidEmail(_)) => {
            // Unknown emails take as long to reject as wrong passwords.
            let _ = hash(&credentials.password, state.password_cost);
            return Err(Error::InvalidCredentials);
        }
        Err(error) => return Err(error),
    };

    if !user.password_hash.verify(&credentials.password)? {
        tracing::info!("Failed log in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    tracing::info!("User {} logged in", user.id);

    state.jwt_config.issue(user.id).map(Json)
}

/// Exchange a refresh token for a new pair of tokens.
///
/// # Errors
///
/// This function will return an [Error::InvalidToken] if the refresh token is
/// invalid or expired, or its user has been deleted.
pub async fn refresh_endpoint(
    State(state): State<AuthState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, Error> {
    let claims = state
        .jwt_config
        .decode(&request.refresh_token, TokenKind::Refresh)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_active_user(claims.user_id(), &connection)?
    };

    state.jwt_config.issue(user.id).map(Json)
}

/// Get the user a token was issued to.
///
/// # Errors
///
/// This function will return an [Error::InvalidToken] if the user has been
/// deleted.
pub(super) fn get_active_user(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    match get_resource::<User>(user_id.as_i64(), Scope::All, connection) {
        Ok(user) => Ok(user),
        Err(Error::NotFound) => Err(Error::InvalidToken),
        Err(error) => Err(error),
    }
}
