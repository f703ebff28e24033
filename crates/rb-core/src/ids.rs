//! Canonical entity identifiers.
//!
//! Records written by older clients carry ids as either JSON strings or
//! numbers. Everything is normalized to a string the moment it is
//! deserialized, so no comparison ever sees two representations.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    /// A fresh time-ordered id: millisecond timestamp prefix plus random bits.
    pub fn generate() -> Self {
        EntityId(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Drafts carry an empty id until the repository assigns one.
    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

impl PartialEq<str> for EntityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct EntityIdVisitor;

impl<'de> Visitor<'de> for EntityIdVisitor {
    type Value = EntityId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or integer id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<EntityId, E> {
        Ok(EntityId(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<EntityId, E> {
        Ok(EntityId(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntityId, E> {
        Ok(EntityId(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntityId, E> {
        Ok(EntityId(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<EntityId, E> {
        if v.fract() == 0.0 && v.is_finite() {
            Ok(EntityId(format!("{}", v as i64)))
        } else {
            Err(E::custom(format!("non-integral numeric id {v}")))
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EntityIdVisitor)
    }
}

/// Reads an optional id; `null` and `""` both mean "no id".
pub fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<EntityId> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|id| !id.is_unassigned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_compare_equal() {
        let from_num: EntityId = serde_json::from_str("1700000000000").unwrap();
        let from_str: EntityId = serde_json::from_str("\"1700000000000\"").unwrap();
        assert_eq!(from_num, from_str);
        assert_eq!(serde_json::to_string(&from_num).unwrap(), "\"1700000000000\"");
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = EntityId::generate();
        let b = EntityId::generate();
        assert_ne!(a, b);
        assert!(!a.is_unassigned());
    }

    #[test]
    fn fractional_id_is_rejected() {
        assert!(serde_json::from_str::<EntityId>("1.5").is_err());
    }
}
