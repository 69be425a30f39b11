//! Resolves the `sort` query parameter, e.g. `name:DESC`.

use std::str::FromStr;

use crate::{
    Error,
    listing::field::{Field, find_field},
};

/// The order to sort items in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Sort in order of increasing value.
    #[default]
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

impl SortDirection {
    /// The SQL keyword for the direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Ascending)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Descending)
        } else {
            Err(Error::InvalidSortDirection(s.to_owned()))
        }
    }
}

/// Sort items by one of a resource's sortable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    /// The name of an allow-listed field.
    pub field: &'static str,
    pub direction: SortDirection,
}

impl Sort {
    /// Resolve a raw `field[:direction]` string against the sortable `fields`.
    ///
    /// The direction is case-insensitive and defaults to ascending. `None` or an
    /// empty string means no sort was requested.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidSortField] if the field is unknown or not
    /// sortable, or an [Error::InvalidSortDirection] if the direction is
    /// neither `ASC` nor `DESC`.
    pub fn resolve(raw: Option<&str>, fields: &'static [Field]) -> Result<Option<Self>, Error> {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        let (name, direction) = match raw.split_once(':') {
            Some((name, direction)) => (name.trim(), direction.trim()),
            None => (raw, ""),
        };

        let field = find_field(fields, name)
            .filter(|field| field.sortable)
            .ok_or_else(|| Error::InvalidSortField(name.to_owned()))?;

        let direction = if direction.is_empty() {
            SortDirection::default()
        } else {
            direction.parse()?
        };

        Ok(Some(Self {
            field: field.name,
            direction,
        }))
    }
}
