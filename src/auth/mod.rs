//! Password hashing, JSON Web Tokens and the log-in endpoints.

mod log_in;
mod password;
pub mod token;

pub use log_in::{log_in_endpoint, refresh_endpoint};
pub use password::PasswordHash;
pub use token::{
    Claims, DEFAULT_ACCESS_TOKEN_LIFETIME, DEFAULT_REFRESH_TOKEN_LIFETIME, JwtConfig,
};
