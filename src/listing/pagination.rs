//! Resolves the `page` and `size` query parameters into a bounded page of data.

use crate::Error;

/// The config for pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Create a config, checking that `1 <= default_page_size <= max_page_size`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidPagination] if the sizes are out of order or zero.
    pub fn new(default_page_size: u64, max_page_size: u64) -> Result<Self, Error> {
        if default_page_size == 0 || default_page_size > max_page_size {
            return Err(Error::InvalidPagination(format!(
                "the default page size must be between 1 and {max_page_size}, got {default_page_size}"
            )));
        }

        Ok(Self {
            default_page_size,
            max_page_size,
        })
    }
}

/// A validated window into a list of items.
///
/// Pages are numbered from one. The invariants `page >= 1`,
/// `1 <= size <= max_page_size` and that the offset fits in an `i64` are
/// checked by [Pagination::resolve].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    size: u64,
}

impl Pagination {
    /// Resolve the raw `page` and `size` query parameters.
    ///
    /// Missing or empty parameters fall back to the first page and the
    /// configured default page size.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidPagination] if either value is not a positive
    /// integer, if `size` is larger than the configured maximum or if the page
    /// starts beyond the largest offset the database supports.
    pub fn resolve(
        page: Option<&str>,
        size: Option<&str>,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        let page = parse_positive("page", page, 1)?;
        let size = parse_positive("size", size, config.default_page_size)?;

        if size > config.max_page_size {
            return Err(Error::InvalidPagination(format!(
                "size must be at most {}, got {size}",
                config.max_page_size
            )));
        }

        let pagination = Self { page, size };

        (page - 1)
            .checked_mul(size)
            .filter(|offset| i64::try_from(*offset).is_ok())
            .ok_or_else(|| Error::InvalidPagination(format!("page {page} is out of range")))?;

        Ok(pagination)
    }

    /// The page number, starting from one.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// The maximum number of items on the page.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The number of items to fetch.
    pub fn limit(&self) -> u64 {
        self.size
    }

    /// The number of items that come before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.size
    }
}

fn parse_positive(name: &str, raw: Option<&str>, default: u64) -> Result<u64, Error> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(default),
    };

    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(Error::InvalidPagination(format!(
            "{name} must be a positive integer, got \"{raw}\""
        ))),
    }
}
