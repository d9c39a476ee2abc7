//! Purpose: Describe record types as field lists with tags and accessors.
//! Exports: `Record`, `Fields`, the `record!` macro and its support functions.
//! Role: Destination descriptor layer; stands in for runtime field reflection.
//! Invariants: A descriptor depends only on the record type, never on a document.
//! Invariants: Descriptors are built once per type and shared read-only afterwards.
//! Invariants: Name indexes are cached per tag namespace inside the descriptor.
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::core::coerce::{Coerce, conversion_error};
use crate::core::config::DecoderConfig;
use crate::core::decode::decode_record;
use crate::core::error::Error;
use crate::core::project::record_map;
use crate::core::resolve::FieldIndex;
use crate::core::value::{Mapping, NativeValue, Value};

/// A struct whose fields the decoder can populate by name.
///
/// Usually implemented through [`record!`](crate::record), which also
/// provides the matching [`Coerce`] implementation.
pub trait Record: Coerce + Default {
    /// Registers every exported field in declaration order.
    fn describe(fields: &mut Fields<Self>);

    /// Field names serde's `Deserialize` expects; `None` keeps the type off
    /// the native fast path.
    fn native_fields() -> Option<&'static [&'static str]> {
        None
    }
}

pub(crate) trait FieldAccess<R>: Send + Sync {
    fn decode(&self, record: &mut R, source: &Value, config: &DecoderConfig) -> Result<(), Error>;
    fn project(&self, record: &R) -> Value;
    fn is_zero(&self, record: &R) -> bool;
    fn native_aligned(&self, source: &Value, config: &DecoderConfig) -> bool;
}

struct Slot<R, T> {
    get: fn(&R) -> &T,
    get_mut: fn(&mut R) -> &mut T,
}

impl<R: 'static, T: Coerce> FieldAccess<R> for Slot<R, T> {
    fn decode(&self, record: &mut R, source: &Value, config: &DecoderConfig) -> Result<(), Error> {
        (self.get_mut)(record).coerce_into(source, config)
    }

    fn project(&self, record: &R) -> Value {
        (self.get)(record).project()
    }

    fn is_zero(&self, record: &R) -> bool {
        (self.get)(record).is_zero()
    }

    fn native_aligned(&self, source: &Value, config: &DecoderConfig) -> bool {
        T::native_aligned(source, config)
    }
}

pub(crate) struct FieldEntry<R> {
    pub(crate) name: &'static str,
    pub(crate) tag: &'static str,
    pub(crate) access: Box<dyn FieldAccess<R>>,
}

/// Field registration sink handed to [`Record::describe`].
pub struct Fields<R> {
    entries: Vec<FieldEntry<R>>,
}

impl<R: 'static> Fields<R> {
    /// Registers one field: its declared name, raw tag text, and accessors.
    pub fn field<T: Coerce>(
        &mut self,
        name: &'static str,
        tag: &'static str,
        get: fn(&R) -> &T,
        get_mut: fn(&mut R) -> &mut T,
    ) -> &mut Self {
        self.entries.push(FieldEntry {
            name,
            tag,
            access: Box::new(Slot { get, get_mut }),
        });
        self
    }
}

pub(crate) struct Descriptor<R> {
    fields: Vec<FieldEntry<R>>,
    native_fields: Option<&'static [&'static str]>,
    indexes: RwLock<HashMap<String, Arc<FieldIndex>>>,
}

type Registry = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

impl<R: Record> Descriptor<R> {
    /// Cached descriptor for `R`, built on first use.
    pub(crate) fn of() -> Arc<Self> {
        let registry = REGISTRY.get_or_init(Registry::default);
        let type_id = TypeId::of::<R>();
        let cached = registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned();
        let entry = match cached {
            Some(entry) => entry,
            None => registry
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(type_id)
                .or_insert_with(|| Arc::new(Self::build()))
                .clone(),
        };
        // Keyed by `TypeId`, so the downcast cannot miss.
        entry.downcast::<Self>().unwrap_or_else(|_| Arc::new(Self::build()))
    }

    fn build() -> Self {
        let mut fields = Fields {
            entries: Vec::new(),
        };
        R::describe(&mut fields);
        tracing::debug!(
            record = %R::type_name(),
            fields = fields.entries.len(),
            "built record descriptor"
        );
        Self {
            fields: fields.entries,
            native_fields: R::native_fields(),
            indexes: RwLock::default(),
        }
    }

    pub(crate) fn fields(&self) -> &[FieldEntry<R>] {
        &self.fields
    }

    /// Name index for one tag namespace.
    pub(crate) fn index(&self, tag_name: &str) -> Arc<FieldIndex> {
        let cached = self
            .indexes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag_name)
            .cloned();
        if let Some(index) = cached {
            return index;
        }
        self.indexes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(tag_name.to_string())
            .or_insert_with(|| {
                Arc::new(FieldIndex::build(
                    self.fields.iter().map(|field| (field.name, field.tag)),
                    tag_name,
                ))
            })
            .clone()
    }
}

/// Populates `record` from a mapping-shaped source; `record` is untouched on error.
pub fn coerce_into<R: Record>(
    record: &mut R,
    source: &Value,
    config: &DecoderConfig,
) -> Result<(), Error> {
    let mapping = match source {
        Value::Null => {
            *record = R::zero();
            return Ok(());
        }
        Value::Mapping(mapping) => Cow::Borrowed(mapping),
        Value::Native(native) => {
            if let Some(exact) = native.downcast_ref::<R>() {
                *record = exact.clone();
                return Ok(());
            }
            // Another record type: copy it over through its field mapping.
            match native.fields(&config.tag_name) {
                Some(mapping) => Cow::Owned(mapping),
                None => return Err(conversion_error(source, R::type_name())),
            }
        }
        _ => return Err(conversion_error(source, R::type_name())),
    };

    let mut staged = record.clone();
    decode_record(&mut staged, &mapping, config)?;
    *record = staged;
    Ok(())
}

pub fn coerce<R: Record>(source: &Value, config: &DecoderConfig) -> Result<R, Error> {
    let mut record = R::zero();
    coerce_into(&mut record, source, config)?;
    Ok(record)
}

/// A record is zero when every registered field is zero.
pub fn is_zero<R: Record>(record: &R) -> bool {
    Descriptor::<R>::of()
        .fields()
        .iter()
        .all(|field| field.access.is_zero(record))
}

/// Whether serde fills the same fields from `mapping` as the map decode engine.
///
/// Every key must either name one field under both schemes (an exact tag
/// match that is also a serde field name, with an aligned value) or be
/// unknown to both.
pub fn fields_aligned<R: Record>(mapping: &Mapping, config: &DecoderConfig) -> bool {
    let descriptor = Descriptor::<R>::of();
    let Some(native) = descriptor.native_fields else {
        return false;
    };
    let index = descriptor.index(&config.tag_name);
    mapping.iter().all(|(key, value)| {
        let known_to_serde = native.contains(&key.as_str());
        match index.resolve_exact(key) {
            Some(position) => {
                known_to_serde && descriptor.fields()[position].access.native_aligned(value, config)
            }
            None => !known_to_serde && index.resolve(key).is_none(),
        }
    })
}

/// Wraps the record itself so projected mappings keep nested records intact.
pub fn project<R: Record>(record: &R) -> Value {
    Value::Native(NativeValue::with_fields(record.clone(), project_fields::<R>))
}

fn project_fields<R: Record>(value: &(dyn Any + Send + Sync), tag_name: &str) -> Option<Mapping> {
    value
        .downcast_ref::<R>()
        .map(|record| record_map(record, tag_name))
}

/// Implements [`Record`] and [`Coerce`] for a struct with `Default + Clone`
/// and a derived `serde::Deserialize`.
///
/// Each field is listed by name, optionally followed by its tag text:
///
/// ```
/// #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
/// struct Server {
///     host: String,
///     port: u16,
///     debug: bool,
/// }
///
/// weakdecode::record! {
///     Server {
///         host: r#"json:"host" yaml:"host""#,
///         port: r#"json:"port,omitempty""#,
///         debug,
///     }
/// }
///
/// let mut server = Server::default();
/// weakdecode::decode_yaml("host: db\nport: \"5432\"\ndebug: yes\n", &mut server).unwrap();
/// assert_eq!(server.port, 5432);
/// assert!(server.debug);
/// ```
#[macro_export]
macro_rules! record {
    (@tag) => {
        ""
    };
    (@tag $tag:literal) => {
        $tag
    };
    ($ty:ty { $($field:ident $(: $tag:literal)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn describe(fields: &mut $crate::Fields<Self>) {
                $(
                    fields.field(
                        stringify!($field),
                        $crate::record!(@tag $($tag)?),
                        |record| &record.$field,
                        |record| &mut record.$field,
                    );
                )*
            }

            fn native_fields() -> ::std::option::Option<&'static [&'static str]> {
                $crate::__macro_support::serde_fields::<Self>()
            }
        }

        impl $crate::Coerce for $ty {
            const KIND: $crate::Kind = $crate::Kind::Record;

            fn type_name() -> ::std::string::String {
                ::std::string::String::from(stringify!($ty))
            }

            fn zero() -> Self {
                <Self as ::std::default::Default>::default()
            }

            fn is_zero(&self) -> bool {
                $crate::__macro_support::is_zero(self)
            }

            fn coerce(
                source: &$crate::Value,
                config: &$crate::DecoderConfig,
            ) -> ::std::result::Result<Self, $crate::Error> {
                $crate::__macro_support::coerce(source, config)
            }

            fn coerce_into(
                &mut self,
                source: &$crate::Value,
                config: &$crate::DecoderConfig,
            ) -> ::std::result::Result<(), $crate::Error> {
                $crate::__macro_support::coerce_into(self, source, config)
            }

            fn project(&self) -> $crate::Value {
                $crate::__macro_support::project(self)
            }

            fn record_map(&self, tag_name: &str) -> ::std::option::Option<$crate::Mapping> {
                ::std::option::Option::Some($crate::__macro_support::record_map(self, tag_name))
            }

            fn fields_aligned(mapping: &$crate::Mapping, config: &$crate::DecoderConfig) -> bool {
                $crate::__macro_support::fields_aligned::<Self>(mapping, config)
            }

            fn populate(
                &mut self,
                mapping: &$crate::Mapping,
                config: &$crate::DecoderConfig,
            ) -> ::std::result::Result<(), $crate::Error> {
                $crate::__macro_support::decode_record(self, mapping, config)
            }
        }
    };
}
