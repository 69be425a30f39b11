//! Create, read, update and soft-delete any [Resource] in a SQLite database.

use rusqlite::{Connection, params_from_iter};
use time::OffsetDateTime;

use crate::{
    Error,
    crud::resource::{
        CREATED_AT_COLUMN, DELETED_AT_COLUMN, DatabaseID, Resource, Scope, UPDATED_AT_COLUMN,
    },
    listing::{
        ListParams, PaginatedResource, PaginationConfig, Predicate, SqlValue,
        query::{ID_COLUMN, where_clause},
    },
};

/// Create a resource and return it with its generated ID.
///
/// # Errors
///
/// This function will return a:
/// - [Error::AlreadyExists] if an active resource already has the same value
///   for one of the unique columns,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_resource<R: Resource>(new: &R::New, connection: &Connection) -> Result<R, Error> {
    let mut values = R::insert_values(new);
    ensure_unique::<R>(&values, None, connection)?;

    let now = now();
    values.push((CREATED_AT_COLUMN, now.into()));
    values.push((UPDATED_AT_COLUMN, now.into()));

    let columns = values
        .iter()
        .map(|(column, _)| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=values.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let query = format!(
        "INSERT INTO \"{}\" ({columns}) VALUES ({placeholders}) RETURNING {}",
        R::TABLE,
        select_columns::<R>()
    );

    connection
        .prepare(&query)?
        .query_row(
            params_from_iter(values.iter().map(|(_, value)| value)),
            R::map_row,
        )
        .map_err(|error| map_write_error::<R>(error, &values))
}

/// Retrieve one page of resources as described by `params`.
///
/// Soft-deleted resources are excluded unless `params.with_deleted` is set.
/// The total counts every resource that matches the filters and scope.
///
/// # Errors
///
/// Returns a validation error if `params` is invalid, or an
/// [Error::SqlError] if there is an SQL error.
pub fn list_resources<R: Resource>(
    params: &ListParams,
    config: &PaginationConfig,
    scope: Scope,
    connection: &Connection,
) -> Result<PaginatedResource<R>, Error> {
    let (pagination, mut query) = params.resolve(R::FIELDS, config)?;

    if !params.with_deleted {
        query = query.and(Predicate::is_null(DELETED_AT_COLUMN));
    }

    for predicate in scope_predicates::<R>(scope) {
        query = query.and(predicate);
    }

    let (where_sql, mut values) = query.where_clause();

    let count: i64 = connection.query_row(
        &format!("SELECT COUNT(*) FROM \"{}\" {where_sql}", R::TABLE),
        params_from_iter(values.iter()),
        |row| row.get(0),
    )?;

    let out_of_range =
        || Error::InvalidPagination(format!("page {} is out of range", pagination.page()));
    let limit = i64::try_from(query.limit()).map_err(|_| out_of_range())?;
    let offset = i64::try_from(query.offset()).map_err(|_| out_of_range())?;

    values.push(SqlValue::Integer(limit));
    values.push(SqlValue::Integer(offset));

    let select = format!(
        "SELECT {} FROM \"{}\" {where_sql} {} LIMIT ?{} OFFSET ?{}",
        select_columns::<R>(),
        R::TABLE,
        query.order_by_clause(),
        values.len() - 1,
        values.len()
    );

    let items = connection
        .prepare(&select)?
        .query_map(params_from_iter(values.iter()), R::map_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PaginatedResource {
        items,
        total: u64::try_from(count).unwrap_or(0),
        page: pagination.page(),
        size: pagination.size(),
    })
}

/// Retrieve an active resource by its `id`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an active resource in `scope`,
/// - [Error::SqlError] if there is some other SQL error.
pub fn get_resource<R: Resource>(
    id: DatabaseID,
    scope: Scope,
    connection: &Connection,
) -> Result<R, Error> {
    let (where_sql, params) = where_clause(&active_row_predicates::<R>(id, scope));

    connection
        .prepare(&format!(
            "SELECT {} FROM \"{}\" {where_sql}",
            select_columns::<R>(),
            R::TABLE
        ))?
        .query_row(params_from_iter(params.iter()), R::map_row)
        .map_err(|error| error.into())
}

/// Retrieve the active resource whose `column` equals `value`, ignoring scope.
///
/// `column` should be one of the resource's unique columns.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if no active resource matches,
/// - [Error::SqlError] if there is some other SQL error.
pub fn find_resource<R: Resource>(
    column: &'static str,
    value: impl Into<SqlValue>,
    connection: &Connection,
) -> Result<R, Error> {
    let (where_sql, params) = where_clause(&[
        Predicate::equal(column, value),
        Predicate::is_null(DELETED_AT_COLUMN),
    ]);

    connection
        .prepare(&format!(
            "SELECT {} FROM \"{}\" {where_sql}",
            select_columns::<R>(),
            R::TABLE
        ))?
        .query_row(params_from_iter(params.iter()), R::map_row)
        .map_err(|error| error.into())
}

/// Apply `patch` to an active resource and return the updated resource.
///
/// Only the columns present in the patch change. The ID and soft-delete
/// marker are never modified.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an active resource in `scope`,
/// - [Error::AlreadyExists] if the patch would duplicate a unique value,
/// - [Error::SqlError] if there is some other SQL error.
pub fn update_resource<R: Resource>(
    id: DatabaseID,
    patch: &R::Patch,
    scope: Scope,
    connection: &Connection,
) -> Result<R, Error> {
    let current = get_resource::<R>(id, scope, connection)?;
    let values = R::patch_values(patch);

    if values.is_empty() {
        return Ok(current);
    }

    ensure_unique::<R>(&values, Some(id), connection)?;

    let (where_sql, mut params) = where_clause(&active_row_predicates::<R>(id, scope));
    let mut assignments = Vec::with_capacity(values.len() + 1);

    for (column, value) in values
        .iter()
        .cloned()
        .chain([(UPDATED_AT_COLUMN, SqlValue::from(now()))])
    {
        params.push(value);
        assignments.push(format!("\"{column}\" = ?{}", params.len()));
    }

    let query = format!(
        "UPDATE \"{}\" SET {} {where_sql} RETURNING {}",
        R::TABLE,
        assignments.join(", "),
        select_columns::<R>()
    );

    connection
        .prepare(&query)?
        .query_row(params_from_iter(params.iter()), R::map_row)
        .map_err(|error| map_write_error::<R>(error, &values))
}

/// Soft-delete a resource by setting its deletion time.
///
/// Removing a resource that is already soft-deleted succeeds and keeps the
/// original deletion time.
///
/// # Errors
///
/// This function will return a:
/// - [Error::NotFound] if `id` has never referred to a resource in `scope`,
/// - [Error::SqlError] if there is some other SQL error.
pub fn remove_resource<R: Resource>(
    id: DatabaseID,
    scope: Scope,
    connection: &Connection,
) -> Result<(), Error> {
    let mut predicates = vec![Predicate::equal(ID_COLUMN, id)];
    predicates.extend(scope_predicates::<R>(scope));

    let (where_sql, mut params) = where_clause(&predicates);
    params.push(now().into());

    let rows_affected = connection.execute(
        &format!(
            "UPDATE \"{}\" SET \"{DELETED_AT_COLUMN}\" = COALESCE(\"{DELETED_AT_COLUMN}\", ?{}) {where_sql}",
            R::TABLE,
            params.len()
        ),
        params_from_iter(params.iter()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

fn select_columns<R: Resource>() -> String {
    R::COLUMNS
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn scope_predicates<R: Resource>(scope: Scope) -> Vec<Predicate> {
    match (scope, R::OWNER_COLUMN) {
        (Scope::Owner(user_id), Some(column)) => vec![Predicate::equal(column, user_id.as_i64())],
        _ => vec![],
    }
}

fn active_row_predicates<R: Resource>(id: DatabaseID, scope: Scope) -> Vec<Predicate> {
    let mut predicates = vec![
        Predicate::equal(ID_COLUMN, id),
        Predicate::is_null(DELETED_AT_COLUMN),
    ];
    predicates.extend(scope_predicates::<R>(scope));

    predicates
}

/// Check that no other active resource uses any of the unique values in `values`.
fn ensure_unique<R: Resource>(
    values: &[(&'static str, SqlValue)],
    excluding: Option<DatabaseID>,
    connection: &Connection,
) -> Result<(), Error> {
    let unique_values = values
        .iter()
        .filter(|(column, _)| R::UNIQUE_COLUMNS.contains(column));

    for &(column, ref value) in unique_values {
        let mut predicates = vec![
            Predicate::equal(column, value.clone()),
            Predicate::is_null(DELETED_AT_COLUMN),
        ];

        if let Some(id) = excluding {
            predicates.push(Predicate::not_equal(ID_COLUMN, id));
        }

        let (where_sql, params) = where_clause(&predicates);
        let exists: bool = connection.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM \"{}\" {where_sql})", R::TABLE),
            params_from_iter(params.iter()),
            |row| row.get(0),
        )?;

        if exists {
            return Err(already_exists::<R>(column, value));
        }
    }

    Ok(())
}

fn map_write_error<R: Resource>(
    error: rusqlite::Error,
    values: &[(&'static str, SqlValue)],
) -> Error {
    let conflict = match &error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(desc)) if sql_error.extended_code == 2067 => {
            values.iter().find(|(column, _)| {
                R::UNIQUE_COLUMNS.contains(column)
                    && desc.ends_with(&format!("{}.{column}", R::TABLE))
            })
        }
        _ => None,
    };

    match conflict {
        Some((column, value)) => already_exists::<R>(*column, value),
        None => error.into(),
    }
}

fn already_exists<R: Resource>(column: &'static str, value: &SqlValue) -> Error {
    let field = R::FIELDS
        .iter()
        .find(|field| field.column == column)
        .map_or(column, |field| field.name);

    Error::AlreadyExists {
        resource: R::NAME,
        field,
        value: value.to_string(),
    }
}
