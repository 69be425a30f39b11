//! Core transaction domain types.

use serde::{Deserialize, Deserializer, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, category::CategoryID, crud::DatabaseID, user::UserID};

/// Database identifier for a transaction.
pub type TransactionID = DatabaseID;

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions belong to the user that created them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: TransactionID,
    pub user_id: UserID,
    pub category_id: Option<CategoryID>,
    pub amount: f64,
    #[serde(with = "crate::timestamp::date")]
    pub date: Date,
    pub description: String,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "crate::timestamp::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(serialize_with = "crate::timestamp::option_rfc3339::serialize")]
    pub deleted_at: Option<OffsetDateTime>,
}

/// The validated data needed to create a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: UserID,
    pub category_id: Option<CategoryID>,
    pub amount: f64,
    pub date: Date,
    pub description: String,
}

/// A partial update to a transaction. `None` fields are left unchanged.
///
/// `category_id` is `Some(None)` when the category should be cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub category_id: Option<Option<CategoryID>>,
    pub amount: Option<f64>,
    pub date: Option<Date>,
    pub description: Option<String>,
}

/// The request body for creating a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    pub amount: f64,
    #[serde(with = "crate::timestamp::date")]
    pub date: Date,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<CategoryID>,
}

/// The request body for updating a transaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionPatchData {
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "crate::timestamp::option_date::deserialize")]
    pub date: Option<Date>,
    pub description: Option<String>,
    /// Missing leaves the category unchanged, `null` clears it.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category_id: Option<Option<CategoryID>>,
}

/// Mark a field as present, even when its value is `null`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount)
    }
}

fn validate_date(date: Date, today: Date) -> Result<Date, Error> {
    if date > today {
        Err(Error::FutureDate(date))
    } else {
        Ok(date)
    }
}

impl NewTransaction {
    /// Validate a new transaction for `user_id`.
    ///
    /// Whether the category exists is checked against the database when the
    /// transaction is created.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::InvalidAmount] if the amount is not a finite number,
    /// - [Error::FutureDate] if the date is after `today`.
    pub fn new(user_id: UserID, data: TransactionData, today: Date) -> Result<Self, Error> {
        Ok(Self {
            user_id,
            category_id: data.category_id,
            amount: validate_amount(data.amount)?,
            date: validate_date(data.date, today)?,
            description: data.description.trim().to_owned(),
        })
    }
}

impl TransactionPatch {
    /// Validate the fields present in an update.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [NewTransaction::new].
    pub fn new(data: TransactionPatchData, today: Date) -> Result<Self, Error> {
        Ok(Self {
            category_id: data.category_id,
            amount: data.amount.map(validate_amount).transpose()?,
            date: data
                .date
                .map(|date| validate_date(date, today))
                .transpose()?,
            description: data
                .description
                .map(|description| description.trim().to_owned()),
        })
    }
}
