//! Defines the app level error type and its conversion into JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::Date;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The `page` or `size` query parameter was invalid.
    ///
    /// The string describes which parameter was invalid and why.
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    /// The client tried to sort on a field that is unknown or not sortable.
    #[error("cannot sort by \"{0}\"")]
    InvalidSortField(String),

    /// The sort direction was neither `ASC` nor `DESC`.
    #[error("invalid sort direction \"{0}\", expected ASC or DESC")]
    InvalidSortDirection(String),

    /// The client tried to filter on a field that is unknown or not filterable.
    #[error("cannot filter by \"{0}\"")]
    InvalidFilterField(String),

    /// The filter operator is unknown or cannot be used with the field's type.
    #[error("cannot filter \"{field}\" with the operator \"{operator}\"")]
    InvalidFilterOperator {
        /// The field named in the filter.
        field: String,
        /// The operator as the client wrote it.
        operator: String,
    },

    /// The filter value is missing or is not a valid value for the field.
    #[error("\"{value}\" is not a valid value to filter \"{field}\" by")]
    InvalidFilterValue {
        /// The field named in the filter.
        field: String,
        /// The value as the client wrote it.
        value: String,
    },

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A transaction amount must be a finite number.
    #[error("the amount must be a finite number")]
    InvalidAmount,

    /// The category ID used for a transaction does not refer to an active category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(i64),

    /// The email and password combination did not match a user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The bearer token is missing, malformed, expired or of the wrong kind.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The requested resource was not found.
    ///
    /// Soft-deleted resources and resources owned by another user are also
    /// reported as not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Another active resource already uses the value of a unique field.
    #[error("a {resource} with the {field} \"{value}\" already exists")]
    AlreadyExists {
        /// The kind of resource, e.g. "category".
        resource: &'static str,
        /// The unique field that clashed.
        field: &'static str,
        /// The value already in use.
        value: String,
    },

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A JSON web token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code for the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidPagination(_)
            | Error::InvalidSortField(_)
            | Error::InvalidSortDirection(_)
            | Error::InvalidFilterField(_)
            | Error::InvalidFilterOperator { .. }
            | Error::InvalidFilterValue { .. }
            | Error::EmptyCategoryName
            | Error::InvalidEmail(_)
            | Error::TooWeak(_)
            | Error::FutureDate(_)
            | Error::InvalidAmount
            | Error::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::AlreadyExists { .. } => StatusCode::CONFLICT,
            Error::SqlError(_)
            | Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server errors are not intended to be shown to the client.
        let message = if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::Error;

    async fn body_text(error: Error) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[tokio::test]
    async fn validation_errors_name_the_field() {
        let (status, body) = body_text(Error::InvalidFilterField("password".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"cannot filter by \"password\""}"#);
    }

    #[tokio::test]
    async fn conflict_names_the_value() {
        let (status, body) = body_text(Error::AlreadyExists {
            resource: "category",
            field: "name",
            value: "Food".to_owned(),
        })
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("Food"), "got body {body}");
    }

    #[tokio::test]
    async fn storage_errors_do_not_leak_details() {
        let error = Error::SqlError(rusqlite::Error::InvalidQuery);

        let (status, body) = body_text(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("SQL"), "got body {body}");
    }

    #[test]
    fn maps_status_codes() {
        assert_eq!(Error::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::InvalidPagination(String::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::DatabaseLockError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
