//! Translates list directives into a storage query.
//!
//! Column names only ever come from a resource's field map, user input only
//! ever reaches the database as bound parameters.

use crate::{
    Error,
    listing::{
        field::{Field, SqlValue},
        filtering::{Filter, FilterOperator, FilterValue},
        pagination::Pagination,
        sorting::{Sort, SortDirection},
    },
};

/// The column every table uses as its primary key.
pub const ID_COLUMN: &str = "id";

/// A binary comparison between a column and a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::NotEqual => "!=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
        }
    }
}

/// A condition on a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: &'static str,
        comparison: Comparison,
        value: SqlValue,
    },
    /// `pattern` is a SQL `LIKE` pattern using `\` as the escape character.
    Like {
        column: &'static str,
        pattern: String,
        negated: bool,
    },
    In {
        column: &'static str,
        values: Vec<SqlValue>,
        negated: bool,
    },
    IsNull {
        column: &'static str,
        negated: bool,
    },
}

impl Predicate {
    /// Shortcut for `column = value`.
    pub fn equal(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Predicate::Compare {
            column,
            comparison: Comparison::Equal,
            value: value.into(),
        }
    }

    /// Shortcut for `column != value`.
    pub fn not_equal(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Predicate::Compare {
            column,
            comparison: Comparison::NotEqual,
            value: value.into(),
        }
    }

    /// Shortcut for `column IS NULL`.
    pub fn is_null(column: &'static str) -> Self {
        Predicate::IsNull {
            column,
            negated: false,
        }
    }

    fn from_filter(column: &'static str, filter: &Filter) -> Result<Self, Error> {
        let compare = |comparison| match &filter.value {
            FilterValue::Single(value) => Ok(Predicate::Compare {
                column,
                comparison,
                value: value.clone(),
            }),
            _ => Err(invalid_value(filter)),
        };

        match filter.operator {
            FilterOperator::Equal => compare(Comparison::Equal),
            FilterOperator::NotEqual => compare(Comparison::NotEqual),
            FilterOperator::GreaterThan => compare(Comparison::Greater),
            FilterOperator::GreaterThanOrEqual => compare(Comparison::GreaterOrEqual),
            FilterOperator::LessThan => compare(Comparison::Less),
            FilterOperator::LessThanOrEqual => compare(Comparison::LessOrEqual),
            FilterOperator::Like | FilterOperator::NotLike => match &filter.value {
                FilterValue::Single(SqlValue::Text(text)) => Ok(Predicate::Like {
                    column,
                    pattern: format!("%{}%", escape_like(text)),
                    negated: filter.operator == FilterOperator::NotLike,
                }),
                _ => Err(invalid_value(filter)),
            },
            FilterOperator::In | FilterOperator::NotIn => match &filter.value {
                FilterValue::List(values) if !values.is_empty() => Ok(Predicate::In {
                    column,
                    values: values.clone(),
                    negated: filter.operator == FilterOperator::NotIn,
                }),
                _ => Err(invalid_value(filter)),
            },
            FilterOperator::IsNull => Ok(Predicate::IsNull {
                column,
                negated: false,
            }),
            FilterOperator::IsNotNull => Ok(Predicate::IsNull {
                column,
                negated: true,
            }),
        }
    }

    fn render(&self, params: &mut Vec<SqlValue>) -> String {
        match self {
            Predicate::Compare {
                column,
                comparison,
                value,
            } => {
                params.push(value.clone());
                format!("\"{column}\" {} ?{}", comparison.as_sql(), params.len())
            }
            Predicate::Like {
                column,
                pattern,
                negated,
            } => {
                params.push(SqlValue::Text(pattern.clone()));
                let not = if *negated { "NOT " } else { "" };
                format!("\"{column}\" {not}LIKE ?{} ESCAPE '\\'", params.len())
            }
            Predicate::In {
                column,
                values,
                negated,
            } => {
                let placeholders = values
                    .iter()
                    .map(|value| {
                        params.push(value.clone());
                        format!("?{}", params.len())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                let not = if *negated { "NOT " } else { "" };
                format!("\"{column}\" {not}IN ({placeholders})")
            }
            Predicate::IsNull { column, negated } => {
                let not = if *negated { "NOT " } else { "" };
                format!("\"{column}\" IS {not}NULL")
            }
        }
    }
}

/// Render `predicates` as a `WHERE` clause joined with `AND`.
///
/// Parameters are numbered from `?1` in the order they are returned. An empty
/// slice renders as an empty string.
pub fn where_clause(predicates: &[Predicate]) -> (String, Vec<SqlValue>) {
    let mut params = Vec::new();

    if predicates.is_empty() {
        return (String::new(), params);
    }

    let conditions = predicates
        .iter()
        .map(|predicate| predicate.render(&mut params))
        .collect::<Vec<_>>()
        .join(" AND ");

    (format!("WHERE {conditions}"), params)
}

/// The column and direction to order a query by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    /// The allow-listed column.
    pub column: &'static str,
    /// Ascending or descending.
    pub direction: SortDirection,
}

/// A storage query for one page of a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    predicates: Vec<Predicate>,
    order_by: Option<OrderBy>,
    limit: u64,
    offset: u64,
}

impl ListQuery {
    /// Combine the resolved directives into a query using the resource's
    /// field map to find each field's column.
    ///
    /// # Errors
    ///
    /// Returns an error if a directive names a field that is not in `fields`,
    /// or if a filter's value does not fit its operator.
    pub fn translate(
        pagination: &Pagination,
        sort: Option<&Sort>,
        filters: &[Filter],
        fields: &[Field],
    ) -> Result<Self, Error> {
        let order_by = sort
            .map(|sort| {
                column_for(fields, sort.field)
                    .map(|column| OrderBy {
                        column,
                        direction: sort.direction,
                    })
                    .ok_or_else(|| Error::InvalidSortField(sort.field.to_owned()))
            })
            .transpose()?;

        let predicates = filters
            .iter()
            .map(|filter| {
                column_for(fields, filter.field)
                    .ok_or_else(|| Error::InvalidFilterField(filter.field.to_owned()))
                    .and_then(|column| Predicate::from_filter(column, filter))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            predicates,
            order_by,
            limit: pagination.limit(),
            offset: pagination.offset(),
        })
    }

    /// Add a condition that every item must also satisfy.
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[cfg(test)]
    pub(crate) fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// The `WHERE` clause and its parameters, see [where_clause].
    pub fn where_clause(&self) -> (String, Vec<SqlValue>) {
        where_clause(&self.predicates)
    }

    /// The `ORDER BY` clause.
    ///
    /// Ties are broken by ID so that pages do not overlap, and without a sort
    /// items come back in the order they were created.
    pub fn order_by_clause(&self) -> String {
        match self.order_by {
            Some(OrderBy { column, direction }) if column != ID_COLUMN => format!(
                "ORDER BY \"{column}\" {}, \"{ID_COLUMN}\" ASC",
                direction.as_sql()
            ),
            Some(OrderBy { direction, .. }) => {
                format!("ORDER BY \"{ID_COLUMN}\" {}", direction.as_sql())
            }
            None => format!("ORDER BY \"{ID_COLUMN}\" ASC"),
        }
    }
}

fn column_for(fields: &[Field], name: &str) -> Option<&'static str> {
    fields
        .iter()
        .find(|field| field.name == name)
        .map(|field| field.column)
}

fn invalid_value(filter: &Filter) -> Error {
    Error::InvalidFilterValue {
        field: filter.field.to_owned(),
        value: String::new(),
    }
}

/// Escape the `LIKE` wildcards in `text` so they match literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
