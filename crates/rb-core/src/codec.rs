//! Serde adapters for the loosely typed shapes older records were written in.

use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer, Serializer};
use std::fmt;

/// `0|1` flags. Accepts booleans, integers and `null` (false); writes 0/1.
pub mod flag {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }
}

/// Optional `0|1` flag for partial updates: absent means "leave as is".
pub mod opt_flag {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        deserializer.deserialize_any(FlagVisitor).map(Some)
    }
}

struct FlagVisitor;

impl<'de> Visitor<'de> for FlagVisitor {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a boolean or 0/1")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
        Ok(v != 0)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
        Ok(v != 0.0)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
        Ok(matches!(v, "1" | "true"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }
}

/// `null` reads as the type's default. For counters and text fields that
/// older records wrote as `null`.
pub fn null_default<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de> + Default,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImagesRepr {
    List(Vec<String>),
    Encoded(String),
}

/// `images` is either a JSON array or a string holding a JSON array.
/// Anything unparseable reads back as an empty list.
pub mod images {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let repr: Option<ImagesRepr> = Option::deserialize(deserializer).unwrap_or(None);
        Ok(match repr {
            Some(ImagesRepr::List(list)) => list,
            Some(ImagesRepr::Encoded(raw)) if raw.trim().is_empty() => Vec::new(),
            Some(ImagesRepr::Encoded(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            None => Vec::new(),
        })
    }
}

/// Same as [`images`] but distinguishes "absent" for partial updates.
pub mod opt_images {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<String>>, D::Error> {
        images::deserialize(deserializer).map(Some)
    }
}

/// Tri-state field for partial updates: absent (`None`), explicit `null`
/// (`Some(None)`), or a value. Use with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
