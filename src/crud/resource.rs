//! The capabilities a type needs to be managed by the generic resource service.

use rusqlite::Row;

use crate::{
    listing::{Field, SqlValue},
    user::UserID,
};

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;

/// The column holding a resource's creation time.
pub const CREATED_AT_COLUMN: &str = "created_at";
/// The column holding the time a resource was last modified.
pub const UPDATED_AT_COLUMN: &str = "updated_at";
/// The column holding the soft-delete marker.
pub const DELETED_AT_COLUMN: &str = "deleted_at";

/// A soft-deletable entity stored in its own table.
///
/// Every table has an integer primary key `id` and the timestamp columns
/// [CREATED_AT_COLUMN], [UPDATED_AT_COLUMN] and [DELETED_AT_COLUMN]. The
/// store sets the timestamps, implementers only describe their own columns.
pub trait Resource: Sized {
    /// The name used in error messages, e.g. "category".
    const NAME: &'static str;

    /// The table the resource is stored in.
    const TABLE: &'static str;

    /// The columns read by [Resource::map_row], in order.
    const COLUMNS: &'static [&'static str];

    /// The fields clients may sort and filter on.
    const FIELDS: &'static [Field];

    /// Columns whose values must be unique among active rows.
    ///
    /// The table must also enforce this with a unique index, the check done by
    /// the store only produces a friendlier error in the common case.
    const UNIQUE_COLUMNS: &'static [&'static str] = &[];

    /// The column naming the user that owns a row, if rows are owned.
    const OWNER_COLUMN: Option<&'static str> = None;

    /// The validated data needed to create the resource.
    type New;

    /// A validated partial update. Fields left out are not changed.
    type Patch;

    /// The column values to insert for `new`.
    fn insert_values(new: &Self::New) -> Vec<(&'static str, SqlValue)>;

    /// The column values to set for `patch`. Must not include the ID or
    /// timestamp columns.
    fn patch_values(patch: &Self::Patch) -> Vec<(&'static str, SqlValue)>;

    /// Convert a row selected with [Resource::COLUMNS] into the resource.
    fn map_row(row: &Row) -> Result<Self, rusqlite::Error>;
}

/// Restricts which rows of a resource a request can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every row.
    All,
    /// Only rows owned by the user, for resources with an owner column.
    Owner(UserID),
}

impl Scope {
    /// The scope for requests made by `user_id` on resource `R`.
    pub fn for_user<R: Resource>(user_id: UserID) -> Self {
        match R::OWNER_COLUMN {
            Some(_) => Scope::Owner(user_id),
            None => Scope::All,
        }
    }
}
