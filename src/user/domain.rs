//! Core user domain types.

use std::fmt::Display;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A valid email address, trimmed and in lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct Email(String);

impl Email {
    /// Parse and normalise an email address.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidEmail] if `raw_email` is
    /// not a valid email address.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        if EmailAddress::is_valid(&email) {
            Ok(Self(email))
        } else {
            Err(Error::InvalidEmail(raw_email.trim().to_owned()))
        }
    }

    /// Create an email without validation.
    ///
    /// The caller should ensure that the string is a valid, normalised address.
    pub fn new_unchecked(email: &str) -> Self {
        Self(email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user of the application.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserID,
    pub email: Email,
    pub name: String,
    #[serde(skip)]
    pub password_hash: PasswordHash,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(serialize_with = "crate::timestamp::option_rfc3339::serialize")]
    pub deleted_at: Option<OffsetDateTime>,
}

/// The data needed to create a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    pub password_hash: PasswordHash,
}

/// A partial update to a user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: Option<Email>,
    pub name: Option<String>,
    pub password_hash: Option<PasswordHash>,
}

/// The request body for registering a user.
#[derive(Serialize, Deserialize)]
pub struct RegisterData {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
}

/// The request body for updating a user.
#[derive(Default, Serialize, Deserialize)]
pub struct UserPatchData {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

impl NewUser {
    /// Validate a registration and hash its password with `password_cost`.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidEmail] or [Error::TooWeak]
    /// if the email or password are invalid, or an [Error::HashingError] if
    /// the password could not be hashed.
    pub fn from_registration(data: RegisterData, password_cost: u32) -> Result<Self, Error> {
        let email = Email::new(&data.email)?;
        let name = data.name.trim().to_owned();
        let password_hash = PasswordHash::from_raw_password(
            &data.password,
            &[email.as_ref(), name.as_str()],
            password_cost,
        )?;

        Ok(Self {
            email,
            name,
            password_hash,
        })
    }
}

impl UserPatch {
    /// Validate an update, hashing a new password with `password_cost`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [NewUser::from_registration] for any field
    /// that is present.
    pub fn from_data(data: UserPatchData, password_cost: u32) -> Result<Self, Error> {
        let email = data.email.as_deref().map(Email::new).transpose()?;
        let name = data.name.map(|name| name.trim().to_owned());
        let password_hash = data
            .password
            .map(|password| {
                let mut user_inputs = Vec::new();
                user_inputs.extend(email.as_ref().map(Email::as_ref));
                user_inputs.extend(name.as_deref());
                PasswordHash::from_raw_password(&password, &user_inputs, password_cost)
            })
            .transpose()?;

        Ok(Self {
            email,
            name,
            password_hash,
        })
    }
}
