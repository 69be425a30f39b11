//! Specifies how dates and timestamps are written in JSON bodies.
//!
//! Timestamps are RFC 3339 strings in UTC, e.g. "2025-01-31T09:30:00Z", and
//! dates are "YYYY-MM-DD" strings, matching what filter values accept.

pub mod rfc3339 {
    //! Serialize a [time::OffsetDateTime] as an RFC 3339 string.
    use serde::Serializer;
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

pub mod option_rfc3339 {
    //! Serialize an optional [time::OffsetDateTime] as an RFC 3339 string or `null`.
    use serde::Serializer;
    use time::OffsetDateTime;

    pub fn serialize<S>(dt: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => super::rfc3339::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }
}

pub mod date {
    //! Serialize a [time::Date] as "YYYY-MM-DD".
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use crate::listing::field::DATE_FORMAT;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

pub mod option_date {
    //! Deserialize an optional "YYYY-MM-DD" date, for partial updates.
    use serde::{Deserialize, Deserializer};
    use time::Date;

    use crate::listing::field::DATE_FORMAT;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}
