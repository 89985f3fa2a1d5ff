//! Serde adapters for SurrealDB value shapes.
//!
//! Record links arrive in two forms depending on who produced the JSON:
//! clients send the string form `"table:id"`, the store hands back its
//! native object form. The adapters here accept either and always emit
//! the string form.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use surrealdb::RecordId;

/// Missing or null bool fields read as true.
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// Missing or null bool fields read as false.
pub fn bool_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

struct AnyRecordId(RecordId);

struct AnyRecordIdVisitor;

impl<'de> Visitor<'de> for AnyRecordIdVisitor {
    type Value = AnyRecordId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a record id in string or object form")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match value.parse::<RecordId>() {
            Ok(id) => Ok(AnyRecordId(id)),
            Err(_) => Err(de::Error::custom(format!(
                "expected table:id, got {value:?}"
            ))),
        }
    }

    fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let id = RecordId::deserialize(de::value::MapAccessDeserializer::new(map))?;
        Ok(AnyRecordId(id))
    }
}

impl<'de> Deserialize<'de> for AnyRecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AnyRecordIdVisitor)
    }
}

/// `#[serde(with = "...")]` adapter for required record links.
pub mod record_id {
    use super::*;

    pub fn serialize<S>(id: &RecordId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<RecordId, D::Error>
    where
        D: Deserializer<'de>,
    {
        AnyRecordId::deserialize(d).map(|wrapped| wrapped.0)
    }
}

/// `#[serde(with = "...")]` adapter for optional record links.
pub mod option_record_id {
    use super::*;

    pub fn serialize<S>(id: &Option<RecordId>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.as_ref().map(|id| id.to_string()).serialize(s)
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<RecordId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wrapped = Option::<AnyRecordId>::deserialize(d)?;
        Ok(wrapped.map(|wrapped| wrapped.0))
    }
}
