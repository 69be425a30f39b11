//! The field map a resource exposes to its list endpoint, and the typed values
//! that filter expressions are coerced into.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{ToSqlOutput, Value},
};
use time::{
    Date, OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

/// The format for dates in query parameters and JSON bodies, e.g. "2025-01-31".
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The type of a field's values.
///
/// The kind decides how a raw filter value is parsed and which filter
/// operators can be applied to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// A 64-bit signed integer, e.g. an ID.
    Integer,
    /// A finite floating point number.
    Real,
    /// A calendar date formatted as `YYYY-MM-DD`.
    Date,
    /// An RFC 3339 timestamp, normalised to UTC.
    DateTime,
}

impl FieldKind {
    /// Whether values of this kind have a meaningful order, i.e. whether
    /// `gt`, `gte`, `lt` and `lte` make sense.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, FieldKind::Text)
    }

    /// Parse `raw` into a value of this kind, or `None` if `raw` is not a
    /// valid value for the kind.
    pub fn parse(&self, raw: &str) -> Option<SqlValue> {
        match self {
            FieldKind::Text => Some(SqlValue::Text(raw.to_owned())),
            FieldKind::Integer => raw.trim().parse().ok().map(SqlValue::Integer),
            FieldKind::Real => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(SqlValue::Real),
            FieldKind::Date => Date::parse(raw.trim(), DATE_FORMAT)
                .ok()
                .map(SqlValue::Date),
            FieldKind::DateTime => OffsetDateTime::parse(raw.trim(), &Rfc3339)
                .ok()
                .map(|date_time| SqlValue::DateTime(date_time.to_offset(UtcOffset::UTC))),
        }
    }
}

/// A field exposed by a resource's list endpoint.
///
/// `name` is what clients use in `sort` and `filter` parameters, `column` is
/// the database column it maps to. Only fields marked sortable or filterable
/// can be used for sorting or filtering respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// The name clients use.
    pub name: &'static str,
    /// The database column.
    pub column: &'static str,
    /// The type filter values are parsed as.
    pub kind: FieldKind,
    /// Whether `sort` may name this field.
    pub sortable: bool,
    /// Whether `filter` may name this field.
    pub filterable: bool,
}

impl Field {
    /// Declare a field that can neither be sorted nor filtered on.
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            sortable: false,
            filterable: false,
        }
    }

    /// Allow sorting on this field.
    pub const fn sortable(self) -> Self {
        Self {
            sortable: true,
            ..self
        }
    }

    /// Allow filtering on this field.
    pub const fn filterable(self) -> Self {
        Self {
            filterable: true,
            ..self
        }
    }
}

/// Find the field called `name` in `fields`.
pub fn find_field(fields: &'static [Field], name: &str) -> Option<&'static Field> {
    fields.iter().find(|field| field.name == name)
}

/// A typed value bound as a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Date(Date),
    DateTime(OffsetDateTime),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Null => Ok(ToSqlOutput::Owned(Value::Null)),
            SqlValue::Text(text) => text.to_sql(),
            SqlValue::Integer(integer) => integer.to_sql(),
            SqlValue::Real(real) => real.to_sql(),
            SqlValue::Date(date) => date.to_sql(),
            SqlValue::DateTime(date_time) => date_time.to_sql(),
        }
    }
}

impl Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "null"),
            SqlValue::Text(text) => write!(f, "{text}"),
            SqlValue::Integer(integer) => write!(f, "{integer}"),
            SqlValue::Real(real) => write!(f, "{real}"),
            SqlValue::Date(date) => write!(f, "{date}"),
            SqlValue::DateTime(date_time) => match date_time.format(&Rfc3339) {
                Ok(formatted) => write!(f, "{formatted}"),
                Err(_) => write!(f, "{date_time}"),
            },
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_owned())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl From<Date> for SqlValue {
    fn from(value: Date) -> Self {
        SqlValue::Date(value)
    }
}

impl From<OffsetDateTime> for SqlValue {
    fn from(value: OffsetDateTime) -> Self {
        SqlValue::DateTime(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod field_kind_tests {
    use time::macros::{date, datetime};

    use super::{FieldKind, SqlValue};

    #[test]
    fn parses_integers() {
        assert_eq!(FieldKind::Integer.parse("42"), Some(SqlValue::Integer(42)));
        assert_eq!(FieldKind::Integer.parse(" -7 "), Some(SqlValue::Integer(-7)));
        assert_eq!(FieldKind::Integer.parse("4.2"), None);
        assert_eq!(FieldKind::Integer.parse("forty two"), None);
    }

    #[test]
    fn rejects_non_finite_reals() {
        assert_eq!(FieldKind::Real.parse("12.5"), Some(SqlValue::Real(12.5)));
        assert_eq!(FieldKind::Real.parse("NaN"), None);
        assert_eq!(FieldKind::Real.parse("inf"), None);
    }

    #[test]
    fn parses_dates() {
        assert_eq!(
            FieldKind::Date.parse("2024-02-29"),
            Some(SqlValue::Date(date!(2024 - 02 - 29)))
        );
        assert_eq!(FieldKind::Date.parse("2023-02-29"), None);
        assert_eq!(FieldKind::Date.parse("29/02/2024"), None);
    }

    #[test]
    fn normalises_date_times_to_utc() {
        let got = FieldKind::DateTime.parse("2025-01-01T12:00:00+12:00");

        assert_eq!(
            got,
            Some(SqlValue::DateTime(datetime!(2025-01-01 00:00:00 UTC)))
        );
    }

    #[test]
    fn text_accepts_anything() {
        assert_eq!(
            FieldKind::Text.parse("🍔 & chips"),
            Some(SqlValue::Text("🍔 & chips".to_owned()))
        );
    }

    #[test]
    fn only_text_is_unordered() {
        assert!(!FieldKind::Text.is_ordered());
        assert!(FieldKind::Integer.is_ordered());
        assert!(FieldKind::Real.is_ordered());
        assert!(FieldKind::Date.is_ordered());
        assert!(FieldKind::DateTime.is_ordered());
    }
}
