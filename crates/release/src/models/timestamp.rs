//! Lenient timestamp (de)serialization for stored records.
//!
//! New timestamps are always written as RFC 3339. Older databases also hold
//! offset-less ISO 8601 values (read as UTC) and the odd unparsable string,
//! which reads back as `None` instead of failing the whole file.

use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

pub(crate) fn parse(value: &str) -> Option<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }
    let naive = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");
    match PrimitiveDateTime::parse(value, naive) {
        Ok(parsed) => Some(parsed.assume_utc()),
        Err(_) => {
            tracing::debug!(value, "Discarding unparsable timestamp");
            None
        },
    }
}

pub(crate) fn serialize<S: Serializer>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
    time::serde::rfc3339::option::serialize(value, serializer)
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.as_deref().and_then(parse))
}
