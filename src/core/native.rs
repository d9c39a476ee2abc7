//! Purpose: Attempt an exact, format-native typed decode before the map decode engine.
//! Exports: `applies`, `try_json`, `try_yaml`, `serde_fields`.
//! Role: Native fast path; a miss is never fatal and only means falling back.
//! Invariants: Only attempted when its outcome matches the map decode contract.
//! Invariants: Every document key must name the same field for serde and for the tag index.
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};

use crate::core::coerce::Coerce;
use crate::core::config::DecoderConfig;
use crate::core::value::Mapping;
use crate::parse::{json, yaml};

/// Whether a serde decode of `document` into `T` fills exactly the fields the
/// map decode engine would.
pub(crate) fn applies<T: Coerce>(document: &Mapping, config: &DecoderConfig) -> bool {
    if !config.allows_native_fast_path() {
        tracing::trace!("native fast path skipped for this configuration");
        return false;
    }
    let aligned = T::fields_aligned(document, config);
    if !aligned {
        tracing::debug!(
            destination = %T::type_name(),
            "native fast path skipped; document keys need field resolution"
        );
    }
    aligned
}

pub(crate) fn try_json<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    let hit = json::from_slice::<T>(bytes).ok();
    trace_outcome("json", hit.is_some());
    hit
}

pub(crate) fn try_yaml<T: DeserializeOwned>(text: &str) -> Option<T> {
    let hit = yaml::from_str::<T>(text).ok();
    trace_outcome("yaml", hit.is_some());
    hit
}

fn trace_outcome(format: &'static str, hit: bool) {
    if hit {
        tracing::debug!(format, "native fast path hit");
    } else {
        tracing::debug!(format, "native fast path miss; falling back to map decode");
    }
}

/// Wire field names of a struct with a derived `Deserialize`.
///
/// `None` when serde does not decode `T` as a plain struct (maps, enums,
/// flattened fields).
pub fn serde_fields<T: DeserializeOwned>() -> Option<&'static [&'static str]> {
    let mut found = None;
    // The recorder always fails after capturing; only `found` matters.
    let _ = T::deserialize(FieldNames { found: &mut found });
    found
}

struct FieldNames<'a> {
    found: &'a mut Option<&'static [&'static str]>,
}

impl<'de> Deserializer<'de> for FieldNames<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.found = Some(fields);
        Err(de::Error::custom("field names recorded"))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}
