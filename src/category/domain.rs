//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, crud::DatabaseID};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is
    /// empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryID = DatabaseID;

/// A category for grouping transactions (e.g., 'Groceries', 'Salary').
///
/// Categories are shared by all users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: CategoryID,
    pub name: CategoryName,
    /// A short label shown next to the name, usually an emoji.
    pub icon: String,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(serialize_with = "crate::timestamp::option_rfc3339::serialize")]
    pub deleted_at: Option<OffsetDateTime>,
}

/// The data needed to create a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub icon: String,
}

/// A partial update to a category. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<CategoryName>,
    pub icon: Option<String>,
}

/// The request body for creating a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryData {
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

/// The request body for updating a category.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CategoryPatchData {
    pub name: Option<String>,
    pub icon: Option<String>,
}

impl TryFrom<CategoryData> for NewCategory {
    type Error = Error;

    fn try_from(data: CategoryData) -> Result<Self, Self::Error> {
        Ok(Self {
            name: CategoryName::new(&data.name)?,
            icon: data.icon.trim().to_owned(),
        })
    }
}

impl TryFrom<CategoryPatchData> for CategoryPatch {
    type Error = Error;

    fn try_from(data: CategoryPatchData) -> Result<Self, Self::Error> {
        Ok(Self {
            name: data.name.as_deref().map(CategoryName::new).transpose()?,
            icon: data.icon.map(|icon| icon.trim().to_owned()),
        })
    }
}
