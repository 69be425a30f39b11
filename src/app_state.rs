//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    auth::{JwtConfig, PasswordHash},
    db::initialize,
    listing::PaginationConfig,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The default and maximum page sizes for list endpoints.
    pub pagination_config: PaginationConfig,

    /// The secrets and lifetimes used to sign access and refresh tokens.
    pub jwt_config: JwtConfig,

    /// The bcrypt cost used when hashing passwords.
    pub password_cost: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_config: JwtConfig,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            pagination_config,
            jwt_config,
            password_cost: PasswordHash::DEFAULT_COST,
        })
    }

    /// Use `password_cost` when hashing passwords instead of the default.
    pub fn with_password_cost(mut self, password_cost: u32) -> Self {
        self.password_cost = password_cost;
        self
    }
}
