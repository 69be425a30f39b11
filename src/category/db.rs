//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    category::{Category, CategoryName, CategoryPatch, NewCategory},
    crud::Resource,
    listing::{Field, FieldKind, SqlValue},
};

impl Resource for Category {
    const NAME: &'static str = "category";
    const TABLE: &'static str = "category";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "icon",
        "created_at",
        "updated_at",
        "deleted_at",
    ];
    const FIELDS: &'static [Field] = &[
        Field::new("id", "id", FieldKind::Integer)
            .sortable()
            .filterable(),
        Field::new("name", "name", FieldKind::Text)
            .sortable()
            .filterable(),
        Field::new("icon", "icon", FieldKind::Text).filterable(),
        Field::new("created_at", "created_at", FieldKind::DateTime)
            .sortable()
            .filterable(),
    ];
    const UNIQUE_COLUMNS: &'static [&'static str] = &["name"];

    type New = NewCategory;
    type Patch = CategoryPatch;

    fn insert_values(new: &NewCategory) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("name", new.name.as_ref().into()),
            ("icon", new.icon.as_str().into()),
        ]
    }

    fn patch_values(patch: &CategoryPatch) -> Vec<(&'static str, SqlValue)> {
        let mut values = Vec::new();

        if let Some(name) = &patch.name {
            values.push(("name", name.as_ref().into()));
        }

        if let Some(icon) = &patch.icon {
            values.push(("icon", icon.as_str().into()));
        }

        values
    }

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let raw_name: String = row.get(1)?;

        Ok(Self {
            id: row.get(0)?,
            name: CategoryName::new_unchecked(&raw_name),
            icon: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
            deleted_at: row.get(5)?,
        })
    }
}

/// Initialize the category table and indexes.
///
/// Names only need to be unique among categories that have not been deleted.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            icon TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_category_name
            ON category(name) WHERE deleted_at IS NULL;",
    )?;

    Ok(())
}
