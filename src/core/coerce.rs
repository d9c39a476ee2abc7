//! Purpose: Convert one document value into one typed destination value.
//! Exports: `Coerce`, `Kind`, `coerce_value`.
//! Role: Type coercion engine; recursion through sequences, mappings, pointers, records.
//! Invariants: Step order is null, exact match, weak rules, collections, records, pointers, numeric.
//! Invariants: A failed conversion returns an error and never yields a partial value.
//! Invariants: Weak (textual) rules only run when the config enables weak typing.
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use time::OffsetDateTime;

use crate::core::config::DecoderConfig;
use crate::core::error::{Conversion, Error, ErrorKind, PathSegment};
use crate::core::timestamp::parse_timestamp;
use crate::core::value::{Mapping, NativeValue, Value};

/// Shape of a destination type, used for dispatch decisions between types.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Any,
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Timestamp,
    Sequence,
    Mapping,
    Record,
    Pointer,
}

/// A type the decoder can produce from a document value and project back.
///
/// Implemented here for scalars, `String`, `OffsetDateTime`, `Value`, `Vec`,
/// `HashMap`, `BTreeMap`, `Option` and `Box`; records get an implementation
/// from the [`record!`](crate::record) macro.
pub trait Coerce: Clone + Send + Sync + 'static {
    const KIND: Kind;

    fn type_name() -> String;

    fn zero() -> Self;

    fn is_zero(&self) -> bool;

    /// Builds a value from a non-null source that is not an exact native match.
    fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error>;

    /// Replaces `self` with the conversion of `source`; `self` is untouched on error.
    fn coerce_into(&mut self, source: &Value, config: &DecoderConfig) -> Result<(), Error> {
        *self = coerce_value(source, config)?;
        Ok(())
    }

    /// The value as it appears in a projected mapping.
    fn project(&self) -> Value;

    /// Field mapping when `Self` is a record.
    fn record_map(&self, _tag_name: &str) -> Option<Mapping> {
        None
    }

    /// Field mapping of the record behind one reference layer.
    fn pointee_record_map(&self, _tag_name: &str) -> Option<Mapping> {
        None
    }

    /// Whether serde and the map decode engine resolve `mapping` to the same
    /// fields of `Self`. Only records can answer yes.
    fn fields_aligned(_mapping: &Mapping, _config: &DecoderConfig) -> bool {
        false
    }

    /// Whether a serde decode of `source` lands in the same fields as the map
    /// decode engine, recursing into nested records.
    fn native_aligned(source: &Value, config: &DecoderConfig) -> bool {
        match source {
            Value::Mapping(mapping) if Self::KIND == Kind::Record => {
                Self::fields_aligned(mapping, config)
            }
            _ => true,
        }
    }

    /// Populates `self` in place from a mapping when `Self` is a record.
    fn populate(&mut self, _mapping: &Mapping, _config: &DecoderConfig) -> Result<(), Error> {
        Err(Error::new(ErrorKind::InvalidDestination).with_message(format!(
            "destination must be a record for mapping decode, got {}",
            Self::type_name()
        )))
    }
}

/// Converts `source` into a `T`, applying the null and exact-match steps first.
pub fn coerce_value<T: Coerce>(source: &Value, config: &DecoderConfig) -> Result<T, Error> {
    match source {
        Value::Null => Ok(T::zero()),
        Value::Native(native) => match native.downcast_ref::<T>() {
            Some(exact) => Ok(exact.clone()),
            None => T::coerce(source, config),
        },
        _ => T::coerce(source, config),
    }
}

pub(crate) fn conversion_error(source: &Value, target_type: String) -> Error {
    let source_type = source.type_name();
    Error::new(ErrorKind::TypeConversion)
        .with_message(format!(
            "cannot convert {source} (type {source_type}) to {target_type}"
        ))
        .with_conversion(Conversion {
            value: source.to_string(),
            source_type: source_type.to_string(),
            target_type,
        })
}

/// Case-insensitive boolean words; covers every standard boolean literal too.
fn parse_bool(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "true" | "1" | "t" | "yes" | "y" | "on" => Some(true),
        "false" | "0" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn split_list(text: &str) -> impl Iterator<Item = Value> + '_ {
    text.split(',').map(|part| Value::String(part.trim().to_string()))
}

/// Truncates toward zero; `None` for NaN and infinities.
fn truncate_float(value: f64) -> Option<i128> {
    value.is_finite().then(|| value.trunc() as i128)
}

fn format_float(value: f64) -> String {
    format!("{value}")
}

macro_rules! impl_coerce_integer {
    ($kind:expr => $($ty:ty),* $(,)?) => {$(
        impl Coerce for $ty {
            const KIND: Kind = $kind;

            fn type_name() -> String {
                stringify!($ty).to_string()
            }

            fn zero() -> Self {
                0
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error> {
                let converted = match source {
                    Value::Int(value) => <$ty>::try_from(*value).ok(),
                    Value::Uint(value) => <$ty>::try_from(*value).ok(),
                    // Same truncation with or without weak typing.
                    Value::Float(value) => {
                        truncate_float(*value).and_then(|whole| <$ty>::try_from(whole).ok())
                    }
                    Value::String(text) if config.weakly_typed => text.parse::<$ty>().ok(),
                    _ => None,
                };
                converted.ok_or_else(|| conversion_error(source, Self::type_name()))
            }

            fn project(&self) -> Value {
                match i64::try_from(*self) {
                    Ok(value) => Value::Int(value),
                    Err(_) => u64::try_from(*self).map_or(Value::Null, Value::Uint),
                }
            }
        }
    )*};
}

impl_coerce_integer!(Kind::Int => i8, i16, i32, i64, isize);
impl_coerce_integer!(Kind::Uint => u8, u16, u32, u64, usize);

macro_rules! impl_coerce_float {
    ($($ty:ty),* $(,)?) => {$(
        impl Coerce for $ty {
            const KIND: Kind = Kind::Float;

            fn type_name() -> String {
                stringify!($ty).to_string()
            }

            fn zero() -> Self {
                0.0
            }

            fn is_zero(&self) -> bool {
                *self == 0.0
            }

            fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error> {
                match source {
                    Value::Float(value) => Ok(*value as $ty),
                    Value::Int(value) => Ok(*value as $ty),
                    Value::Uint(value) => Ok(*value as $ty),
                    Value::String(text) if config.weakly_typed => text
                        .parse::<$ty>()
                        .map_err(|_| conversion_error(source, Self::type_name())),
                    _ => Err(conversion_error(source, Self::type_name())),
                }
            }

            fn project(&self) -> Value {
                Value::Float(f64::from(*self))
            }
        }
    )*};
}

impl_coerce_float!(f32, f64);

impl Coerce for bool {
    const KIND: Kind = Kind::Bool;

    fn type_name() -> String {
        "bool".to_string()
    }

    fn zero() -> Self {
        false
    }

    fn is_zero(&self) -> bool {
        !*self
    }

    fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error> {
        match source {
            Value::Bool(value) => Ok(*value),
            Value::String(text) if config.weakly_typed => {
                parse_bool(text).ok_or_else(|| conversion_error(source, Self::type_name()))
            }
            _ => Err(conversion_error(source, Self::type_name())),
        }
    }

    fn project(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Coerce for String {
    const KIND: Kind = Kind::Text;

    fn type_name() -> String {
        "String".to_string()
    }

    fn zero() -> Self {
        String::new()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error> {
        match source {
            Value::String(text) => Ok(text.clone()),
            Value::Float(value) if config.weakly_typed => Ok(format_float(*value)),
            Value::Int(value) if config.weakly_typed => Ok(value.to_string()),
            Value::Uint(value) if config.weakly_typed => Ok(value.to_string()),
            _ => Err(conversion_error(source, Self::type_name())),
        }
    }

    fn project(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Coerce for OffsetDateTime {
    const KIND: Kind = Kind::Timestamp;

    fn type_name() -> String {
        "OffsetDateTime".to_string()
    }

    fn zero() -> Self {
        OffsetDateTime::UNIX_EPOCH
    }

    fn is_zero(&self) -> bool {
        *self == OffsetDateTime::UNIX_EPOCH
    }

    fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error> {
        match source {
            Value::String(text) if config.weakly_typed => {
                parse_timestamp(text).ok_or_else(|| conversion_error(source, Self::type_name()))
            }
            _ => Err(conversion_error(source, Self::type_name())),
        }
    }

    fn project(&self) -> Value {
        Value::Native(NativeValue::new(*self))
    }
}

/// The "any" destination: keeps the source as-is.
impl Coerce for Value {
    const KIND: Kind = Kind::Any;

    fn type_name() -> String {
        "Value".to_string()
    }

    fn zero() -> Self {
        Value::Null
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }

    fn coerce(source: &Value, _config: &DecoderConfig) -> Result<Self, Error> {
        Ok(source.clone())
    }

    fn project(&self) -> Value {
        self.clone()
    }

    fn record_map(&self, tag_name: &str) -> Option<Mapping> {
        match self {
            Value::Native(native) => native.fields(tag_name),
            _ => None,
        }
    }
}

impl<T: Coerce> Coerce for Vec<T> {
    const KIND: Kind = Kind::Sequence;

    fn type_name() -> String {
        format!("Vec<{}>", T::type_name())
    }

    fn zero() -> Self {
        Vec::new()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error> {
        match source {
            Value::String(text) if config.weakly_typed && T::KIND == Kind::Text => split_list(text)
                .map(|part| coerce_value::<T>(&part, config))
                .collect(),
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    coerce_value::<T>(item, config).map_err(|err| err.within(PathSegment::Index(index)))
                })
                .collect(),
            _ => Err(conversion_error(source, Self::type_name())),
        }
    }

    fn project(&self) -> Value {
        Value::Sequence(self.iter().map(Coerce::project).collect())
    }

    fn native_aligned(source: &Value, config: &DecoderConfig) -> bool {
        match source {
            Value::Sequence(items) => items.iter().all(|item| T::native_aligned(item, config)),
            _ => true,
        }
    }
}

fn coerce_entries<K, V, C>(source: &Value, config: &DecoderConfig, target_type: String) -> Result<C, Error>
where
    K: Coerce,
    V: Coerce,
    C: FromIterator<(K, V)>,
{
    let Value::Mapping(mapping) = source else {
        return Err(conversion_error(source, target_type));
    };
    mapping
        .iter()
        .map(|(key, value)| {
            let converted_key = coerce_value::<K>(&Value::String(key.clone()), config)
                .map_err(|err| err.within(PathSegment::MapKey(key.clone())))?;
            let converted_value = coerce_value::<V>(value, config)
                .map_err(|err| err.within(PathSegment::MapValue(key.clone())))?;
            Ok::<_, Error>((converted_key, converted_value))
        })
        .collect()
}

/// Serde reads non-text keys from their text form even without weak typing.
fn entries_aligned<K: Coerce, V: Coerce>(source: &Value, config: &DecoderConfig) -> bool {
    match source {
        Value::Mapping(mapping) => {
            (K::KIND == Kind::Text || config.weakly_typed)
                && mapping.values().all(|value| V::native_aligned(value, config))
        }
        _ => true,
    }
}

fn key_text<K: Coerce>(key: &K) -> String {
    match key.project() {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

impl<K, V> Coerce for HashMap<K, V>
where
    K: Coerce + Eq + Hash,
    V: Coerce,
{
    const KIND: Kind = Kind::Mapping;

    fn type_name() -> String {
        format!("HashMap<{}, {}>", K::type_name(), V::type_name())
    }

    fn zero() -> Self {
        HashMap::new()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error> {
        coerce_entries(source, config, Self::type_name())
    }

    fn native_aligned(source: &Value, config: &DecoderConfig) -> bool {
        entries_aligned::<K, V>(source, config)
    }

    fn project(&self) -> Value {
        Value::Mapping(
            self.iter()
                .map(|(key, value)| (key_text(key), value.project()))
                .collect(),
        )
    }
}

impl<K, V> Coerce for BTreeMap<K, V>
where
    K: Coerce + Ord,
    V: Coerce,
{
    const KIND: Kind = Kind::Mapping;

    fn type_name() -> String {
        format!("BTreeMap<{}, {}>", K::type_name(), V::type_name())
    }

    fn zero() -> Self {
        BTreeMap::new()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error> {
        coerce_entries(source, config, Self::type_name())
    }

    fn native_aligned(source: &Value, config: &DecoderConfig) -> bool {
        entries_aligned::<K, V>(source, config)
    }

    fn project(&self) -> Value {
        Value::Mapping(
            self.iter()
                .map(|(key, value)| (key_text(key), value.project()))
                .collect(),
        )
    }
}

impl<T: Coerce> Coerce for Option<T> {
    const KIND: Kind = Kind::Pointer;

    fn type_name() -> String {
        format!("Option<{}>", T::type_name())
    }

    fn zero() -> Self {
        None
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error> {
        coerce_value::<T>(source, config).map(Some)
    }

    fn project(&self) -> Value {
        self.as_ref().map_or(Value::Null, Coerce::project)
    }

    fn pointee_record_map(&self, tag_name: &str) -> Option<Mapping> {
        self.as_ref().and_then(|inner| inner.record_map(tag_name))
    }

    fn native_aligned(source: &Value, config: &DecoderConfig) -> bool {
        T::native_aligned(source, config)
    }
}

impl<T: Coerce> Coerce for Box<T> {
    const KIND: Kind = Kind::Pointer;

    fn type_name() -> String {
        format!("Box<{}>", T::type_name())
    }

    fn zero() -> Self {
        Box::new(T::zero())
    }

    fn is_zero(&self) -> bool {
        self.as_ref().is_zero()
    }

    fn coerce(source: &Value, config: &DecoderConfig) -> Result<Self, Error> {
        coerce_value::<T>(source, config).map(Box::new)
    }

    fn project(&self) -> Value {
        self.as_ref().project()
    }

    fn pointee_record_map(&self, tag_name: &str) -> Option<Mapping> {
        self.as_ref().record_map(tag_name)
    }

    fn native_aligned(source: &Value, config: &DecoderConfig) -> bool {
        T::native_aligned(source, config)
    }
}
