//! Issues and checks the JSON Web Tokens used for authentication.
//!
//! A successful log in returns a short-lived access token, sent as a bearer
//! token with each request, and a longer-lived refresh token that can only be
//! exchanged for a new pair of tokens.

use std::fmt::Debug;

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::log_in::{AuthState, get_active_user},
    crud::lock_connection,
    user::UserID,
};

/// The default lifetime of access tokens.
pub const DEFAULT_ACCESS_TOKEN_LIFETIME: Duration = Duration::minutes(15);
/// The default lifetime of refresh tokens.
pub const DEFAULT_REFRESH_TOKEN_LIFETIME: Duration = Duration::days(7);

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Sent as a bearer token to authenticate requests.
    Access,
    /// Only accepted by the refresh endpoint.
    Refresh,
}

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: UserID,
    /// The time the token was issued as a Unix timestamp.
    pub iat: i64,
    /// The expiry time of the token as a Unix timestamp.
    pub exp: i64,
    /// What the token may be used for.
    pub kind: TokenKind,
}

impl Claims {
    /// The ID of the authenticated user.
    pub fn user_id(&self) -> UserID {
        self.sub
    }
}

/// Extracts the claims of a valid access token sent as a bearer token.
///
/// The token is rejected once its user has been deleted, even if it has not
/// expired yet.
impl<S> FromRequestParts<S> for Claims
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| Error::InvalidToken)?;

        let state = AuthState::from_ref(state);
        let claims = state.jwt_config.decode(bearer.token(), TokenKind::Access)?;

        let connection = lock_connection(&state.db_connection)?;
        get_active_user(claims.user_id(), &connection)?;

        Ok(claims)
    }
}

/// The tokens returned after logging in or refreshing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    /// A short-lived token for authenticating requests.
    pub access_token: String,
    /// A longer-lived token that can be exchanged for a new pair.
    pub refresh_token: String,
    /// Always "Bearer".
    pub token_type: String,
    /// The lifetime of the access token in seconds.
    pub expires_in: i64,
}

#[derive(Clone)]
struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenKeys {
    fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }
}

/// The signing keys and lifetimes for access and refresh tokens.
///
/// Access and refresh tokens are signed with different secrets, so a token of
/// one kind never validates as the other.
#[derive(Clone)]
pub struct JwtConfig {
    access: TokenKeys,
    refresh: TokenKeys,
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_lifetime", &self.access.lifetime)
            .field("refresh_lifetime", &self.refresh.lifetime)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    /// Create the config from the two signing secrets and token lifetimes.
    pub fn new(
        access_secret: &str,
        access_lifetime: Duration,
        refresh_secret: &str,
        refresh_lifetime: Duration,
    ) -> Self {
        Self {
            access: TokenKeys::new(access_secret, access_lifetime),
            refresh: TokenKeys::new(refresh_secret, refresh_lifetime),
        }
    }

    /// The lifetime of access tokens.
    pub fn access_lifetime(&self) -> Duration {
        self.access.lifetime
    }

    fn keys(&self, kind: TokenKind) -> &TokenKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Issue a new access and refresh token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::TokenCreation] if a token could not be signed.
    pub fn issue(&self, user_id: UserID) -> Result<TokenPair, Error> {
        let now = OffsetDateTime::now_utc();

        Ok(TokenPair {
            access_token: self.encode(user_id, TokenKind::Access, now)?,
            refresh_token: self.encode(user_id, TokenKind::Refresh, now)?,
            token_type: "Bearer".to_owned(),
            expires_in: self.access.lifetime.whole_seconds(),
        })
    }

    fn encode(&self, user_id: UserID, kind: TokenKind, now: OffsetDateTime) -> Result<String, Error> {
        let keys = self.keys(kind);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: (now + keys.lifetime).unix_timestamp(),
            kind,
        };

        encode(&Header::default(), &claims, &keys.encoding_key)
            .map_err(|error| Error::TokenCreation(error.to_string()))
    }

    /// Check that `token` is a valid, unexpired token of the given `kind` and
    /// return its claims.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidToken] otherwise.
    pub fn decode(&self, token: &str, kind: TokenKind) -> Result<Claims, Error> {
        let claims = decode::<Claims>(token, &self.keys(kind).decoding_key, &Validation::default())
            .map_err(|error| {
                tracing::debug!("Rejected {kind:?} token: {error}");
                Error::InvalidToken
            })?
            .claims;

        if claims.kind != kind {
            return Err(Error::InvalidToken);
        }

        Ok(claims)
    }
}
