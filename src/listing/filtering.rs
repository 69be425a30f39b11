//! Resolves `filter` query parameters of the form `field||operator||value`.
//!
//! Filters on the same request are combined with AND. The `in` and `nin`
//! operators take a comma separated list of values, which are combined with OR
//! within the field.

use std::{fmt::Display, str::FromStr};

use crate::{
    Error,
    listing::field::{Field, FieldKind, SqlValue, find_field},
};

/// Separates the field, operator and value of a filter expression.
const SEPARATOR: &str = "||";

/// Separates the values for the `in` and `nin` operators.
const LIST_SEPARATOR: char = ',';

/// A comparison applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// `eq`
    Equal,
    /// `neq`, never matches a null value.
    NotEqual,
    /// `gt`
    GreaterThan,
    /// `gte`
    GreaterThanOrEqual,
    /// `lt`
    LessThan,
    /// `lte`
    LessThanOrEqual,
    /// `like`, a case-insensitive substring match.
    Like,
    /// `nlike`, the negation of [FilterOperator::Like]. Never matches a null value.
    NotLike,
    /// `in`, matches any value in a comma-separated list.
    In,
    /// `nin`, matches none of the values in a list. Never matches a null value.
    NotIn,
    /// `isnull`
    IsNull,
    /// `isnotnull`
    IsNotNull,
}

impl FilterOperator {
    const ALL: [FilterOperator; 12] = [
        FilterOperator::Equal,
        FilterOperator::NotEqual,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEqual,
        FilterOperator::Like,
        FilterOperator::NotLike,
        FilterOperator::In,
        FilterOperator::NotIn,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
    ];

    /// The operator as it is written in a filter expression.
    pub fn token(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "eq",
            FilterOperator::NotEqual => "neq",
            FilterOperator::GreaterThan => "gt",
            FilterOperator::GreaterThanOrEqual => "gte",
            FilterOperator::LessThan => "lt",
            FilterOperator::LessThanOrEqual => "lte",
            FilterOperator::Like => "like",
            FilterOperator::NotLike => "nlike",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "nin",
            FilterOperator::IsNull => "isnull",
            FilterOperator::IsNotNull => "isnotnull",
        }
    }

    /// Whether the operator can be applied to fields of type `kind`.
    pub fn applies_to(&self, kind: FieldKind) -> bool {
        match self {
            FilterOperator::Like | FilterOperator::NotLike => kind == FieldKind::Text,
            FilterOperator::GreaterThan
            | FilterOperator::GreaterThanOrEqual
            | FilterOperator::LessThan
            | FilterOperator::LessThanOrEqual => kind.is_ordered(),
            _ => true,
        }
    }

    fn takes_value(&self) -> bool {
        !matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }

    fn takes_list(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::NotIn)
    }
}

impl FromStr for FilterOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .into_iter()
            .find(|operator| operator.token().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// The operand of a filter, already coerced to the field's type.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// For operators that take no value, e.g. `isnull`.
    None,
    /// For every other operator.
    Single(SqlValue),
    /// For `in` and `nin`. Never empty.
    List(Vec<SqlValue>),
}

/// A predicate on one of a resource's filterable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// The name of an allow-listed field.
    pub field: &'static str,
    /// How the field is compared.
    pub operator: FilterOperator,
    /// What the field is compared against.
    pub value: FilterValue,
}

impl Filter {
    /// Resolve a raw `field||operator||value` expression against the
    /// filterable `fields`.
    ///
    /// The value may be omitted for `isnull` and `isnotnull`, and is ignored
    /// if given.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::InvalidFilterField] if the field is unknown or not filterable,
    /// - [Error::InvalidFilterOperator] if the operator is unknown or does not
    ///   apply to the field's type,
    /// - [Error::InvalidFilterValue] if the value is missing or cannot be
    ///   parsed as the field's type.
    pub fn resolve(raw: &str, fields: &'static [Field]) -> Result<Self, Error> {
        let mut parts = raw.splitn(3, SEPARATOR);
        let name = parts.next().unwrap_or_default().trim();
        let raw_operator = parts.next().map(str::trim);
        let raw_value = parts.next();

        let field = find_field(fields, name)
            .filter(|field| field.filterable)
            .ok_or_else(|| Error::InvalidFilterField(name.to_owned()))?;

        let operator = raw_operator
            .and_then(|operator| operator.parse::<FilterOperator>().ok())
            .filter(|operator| operator.applies_to(field.kind))
            .ok_or_else(|| Error::InvalidFilterOperator {
                field: field.name.to_owned(),
                operator: raw_operator.unwrap_or_default().to_owned(),
            })?;

        let value = resolve_value(field, operator, raw_value)?;

        Ok(Self {
            field: field.name,
            operator,
            value,
        })
    }
}

/// Resolve every raw filter expression in `raw_filters`, keeping their order.
///
/// # Errors
///
/// Returns the error for the first expression that fails to resolve, see
/// [Filter::resolve].
pub fn resolve_filters(
    raw_filters: &[String],
    fields: &'static [Field],
) -> Result<Vec<Filter>, Error> {
    raw_filters
        .iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| Filter::resolve(raw, fields))
        .collect()
}

fn resolve_value(
    field: &Field,
    operator: FilterOperator,
    raw_value: Option<&str>,
) -> Result<FilterValue, Error> {
    if !operator.takes_value() {
        return Ok(FilterValue::None);
    }

    let invalid_value = |value: &str| Error::InvalidFilterValue {
        field: field.name.to_owned(),
        value: value.to_owned(),
    };

    let raw_value = raw_value.ok_or_else(|| invalid_value(""))?;

    if operator.takes_list() {
        if raw_value.trim().is_empty() {
            return Err(invalid_value(raw_value));
        }

        raw_value
            .split(LIST_SEPARATOR)
            .map(str::trim)
            .map(|item| field.kind.parse(item).ok_or_else(|| invalid_value(item)))
            .collect::<Result<Vec<_>, _>>()
            .map(FilterValue::List)
    } else {
        field
            .kind
            .parse(raw_value)
            .map(FilterValue::Single)
            .ok_or_else(|| invalid_value(raw_value))
    }
}
