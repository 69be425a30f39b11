//! Code for creating the user table and fetching users from the database.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::PasswordHash,
    crud::{Resource, find_resource},
    listing::{Field, FieldKind, SqlValue},
    user::{Email, NewUser, User, UserID, UserPatch},
};

impl Resource for User {
    const NAME: &'static str = "user";
    const TABLE: &'static str = "user";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "email",
        "name",
        "password",
        "created_at",
        "updated_at",
        "deleted_at",
    ];
    const FIELDS: &'static [Field] = &[
        Field::new("id", "id", FieldKind::Integer)
            .sortable()
            .filterable(),
        Field::new("email", "email", FieldKind::Text)
            .sortable()
            .filterable(),
        Field::new("name", "name", FieldKind::Text)
            .sortable()
            .filterable(),
        Field::new("created_at", "created_at", FieldKind::DateTime)
            .sortable()
            .filterable(),
    ];
    const UNIQUE_COLUMNS: &'static [&'static str] = &["email"];
    // Users can only see and change their own account.
    const OWNER_COLUMN: Option<&'static str> = Some("id");

    type New = NewUser;
    type Patch = UserPatch;

    fn insert_values(new: &NewUser) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("email", new.email.as_ref().into()),
            ("name", new.name.as_str().into()),
            ("password", new.password_hash.as_ref().into()),
        ]
    }

    fn patch_values(patch: &UserPatch) -> Vec<(&'static str, SqlValue)> {
        let mut values = Vec::new();

        if let Some(email) = &patch.email {
            values.push(("email", email.as_ref().into()));
        }

        if let Some(name) = &patch.name {
            values.push(("name", name.as_str().into()));
        }

        if let Some(password_hash) = &patch.password_hash {
            values.push(("password", password_hash.as_ref().into()));
        }

        values
    }

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let raw_email: String = row.get(1)?;
        let raw_password_hash: String = row.get(3)?;

        Ok(Self {
            id: UserID::new(row.get(0)?),
            email: Email::new_unchecked(&raw_email),
            name: row.get(2)?,
            password_hash: PasswordHash::new_unchecked(&raw_password_hash),
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            deleted_at: row.get(6)?,
        })
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL,
            name TEXT NOT NULL DEFAULT '',
            password TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_user_email
            ON user(email) WHERE deleted_at IS NULL;",
    )?;

    Ok(())
}

/// Get the active user with the email address `raw_email`.
///
/// # Errors
///
/// This function will return an error if:
/// - `raw_email` is not a valid email address,
/// - `raw_email` does not belong to an active user,
/// - there was an error trying to access the store.
pub fn get_user_by_email(raw_email: &str, connection: &Connection) -> Result<User, Error> {
    let email = Email::new(raw_email)?;

    find_resource("email", email.as_ref(), connection)
}
