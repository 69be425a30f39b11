//! The raw query parameters accepted by every list endpoint.

use serde::Deserialize;

use crate::{
    Error,
    listing::{
        field::Field,
        filtering::resolve_filters,
        pagination::{Pagination, PaginationConfig},
        query::ListQuery,
        sorting::Sort,
    },
};

/// Query parameters for a list endpoint, e.g.
/// `?page=2&size=20&sort=name:DESC&filter=name||like||foo&filter=id||gt||3`.
///
/// Values are kept as strings so that invalid input produces a descriptive
/// error instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
    /// Repeatable `field||operator||value` expressions.
    #[serde(default)]
    pub filter: Vec<String>,
    /// Include soft-deleted items.
    #[serde(default)]
    pub with_deleted: bool,
}

impl ListParams {
    /// Resolve the parameters against a resource's `fields` and translate them
    /// into a storage query.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found in the pagination, sort or
    /// filter parameters.
    pub fn resolve(
        &self,
        fields: &'static [Field],
        config: &PaginationConfig,
    ) -> Result<(Pagination, ListQuery), Error> {
        let pagination = Pagination::resolve(self.page.as_deref(), self.size.as_deref(), config)?;
        let sort = Sort::resolve(self.sort.as_deref(), fields)?;
        let filters = resolve_filters(&self.filter, fields)?;
        let query = ListQuery::translate(&pagination, sort.as_ref(), &filters, fields)?;

        Ok((pagination, query))
    }
}

#[cfg(test)]
mod list_params_tests {
    use crate::{
        Error,
        listing::{
            field::{Field, FieldKind},
            pagination::PaginationConfig,
        },
    };

    use super::ListParams;

    const FIELDS: &[Field] = &[
        Field::new("id", "id", FieldKind::Integer).sortable(),
        Field::new("name", "name", FieldKind::Text)
            .sortable()
            .filterable(),
    ];

    #[test]
    fn parses_repeated_filters() {
        let params: ListParams =
            serde_html_form::from_str("filter=name||like||foo&filter=name||neq||food&page=2")
                .unwrap();

        assert_eq!(params.filter, vec!["name||like||foo", "name||neq||food"]);
        assert_eq!(params.page.as_deref(), Some("2"));
        assert!(!params.with_deleted);
    }

    #[test]
    fn parses_single_filter_and_flags() {
        let params: ListParams =
            serde_html_form::from_str("filter=name||eq||Food&with_deleted=true&sort=name:desc")
                .unwrap();

        assert_eq!(params.filter, vec!["name||eq||Food"]);
        assert!(params.with_deleted);
        assert_eq!(params.sort.as_deref(), Some("name:desc"));
    }

    #[test]
    fn empty_query_string_is_default() {
        let params: ListParams = serde_html_form::from_str("").unwrap();

        assert_eq!(params, ListParams::default());
    }

    #[test]
    fn resolves_into_query() {
        let params = ListParams {
            page: Some("3".to_owned()),
            size: Some("5".to_owned()),
            sort: Some("name:DESC".to_owned()),
            filter: vec!["name||like||foo".to_owned()],
            with_deleted: false,
        };

        let (pagination, query) = params
            .resolve(FIELDS, &PaginationConfig::default())
            .unwrap();

        assert_eq!(pagination.page(), 3);
        assert_eq!(query.limit(), 5);
        assert_eq!(query.offset(), 10);
        assert_eq!(query.predicates().len(), 1);
        assert_eq!(
            query.order_by_clause(),
            "ORDER BY \"name\" DESC, \"id\" ASC"
        );
    }

    #[test]
    fn reports_pagination_errors_first() {
        let params = ListParams {
            page: Some("zero".to_owned()),
            sort: Some("nope".to_owned()),
            ..Default::default()
        };

        let got = params.resolve(FIELDS, &PaginationConfig::default());

        assert!(matches!(got, Err(Error::InvalidPagination(_))));
    }
}
