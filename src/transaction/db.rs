//! Database operations for transactions.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryID},
    crud::{Resource, Scope, get_resource},
    listing::{Field, FieldKind, SqlValue},
    transaction::{NewTransaction, Transaction, TransactionPatch},
    user::UserID,
};

impl Resource for Transaction {
    const NAME: &'static str = "transaction";
    const TABLE: &'static str = "transaction";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "category_id",
        "amount",
        "date",
        "description",
        "created_at",
        "updated_at",
        "deleted_at",
    ];
    const FIELDS: &'static [Field] = &[
        Field::new("id", "id", FieldKind::Integer)
            .sortable()
            .filterable(),
        Field::new("amount", "amount", FieldKind::Real)
            .sortable()
            .filterable(),
        Field::new("date", "date", FieldKind::Date)
            .sortable()
            .filterable(),
        Field::new("description", "description", FieldKind::Text)
            .sortable()
            .filterable(),
        Field::new("category_id", "category_id", FieldKind::Integer).filterable(),
        Field::new("created_at", "created_at", FieldKind::DateTime)
            .sortable()
            .filterable(),
    ];
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");

    type New = NewTransaction;
    type Patch = TransactionPatch;

    fn insert_values(new: &NewTransaction) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("user_id", new.user_id.as_i64().into()),
            ("category_id", new.category_id.into()),
            ("amount", new.amount.into()),
            ("date", new.date.into()),
            ("description", new.description.as_str().into()),
        ]
    }

    fn patch_values(patch: &TransactionPatch) -> Vec<(&'static str, SqlValue)> {
        let mut values = Vec::new();

        if let Some(category_id) = patch.category_id {
            values.push(("category_id", category_id.into()));
        }

        if let Some(amount) = patch.amount {
            values.push(("amount", amount.into()));
        }

        if let Some(date) = patch.date {
            values.push(("date", date.into()));
        }

        if let Some(description) = &patch.description {
            values.push(("description", description.as_str().into()));
        }

        values
    }

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            user_id: UserID::new(row.get(1)?),
            category_id: row.get(2)?,
            amount: row.get(3)?,
            date: row.get(4)?,
            description: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            deleted_at: row.get(8)?,
        })
    }
}

/// Create the transaction table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed, or if the
/// user and category tables do not exist yet.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Check that `category_id` refers to an active category.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if the category does not exist or has
/// been deleted.
pub fn check_category(category_id: CategoryID, connection: &Connection) -> Result<(), Error> {
    match get_resource::<Category>(category_id, Scope::All, connection) {
        Ok(_) => Ok(()),
        Err(Error::NotFound) => Err(Error::InvalidCategory(category_id)),
        Err(error) => Err(error),
    }
}
