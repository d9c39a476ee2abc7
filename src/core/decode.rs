//! Purpose: Populate a destination from a generic mapping.
//! Exports: `decode_record`, `decode_mapping`.
//! Role: Map decode engine; joins the field resolver with the coercion engine.
//! Invariants: A field that fails to convert keeps its previous value; the decode aborts.
//! Invariants: Fields converted before a failure stay populated (no rollback).
//! Invariants: Unknown keys are reported only after every known key was decoded.
use crate::core::coerce::{Coerce, Kind};
use crate::core::config::DecoderConfig;
use crate::core::error::{Error, ErrorKind, PathSegment};
use crate::core::record::{Descriptor, Record};
use crate::core::value::Mapping;

/// Decodes `mapping` into `record` field by field.
pub fn decode_record<R: Record>(
    record: &mut R,
    mapping: &Mapping,
    config: &DecoderConfig,
) -> Result<(), Error> {
    let descriptor = Descriptor::<R>::of();
    let index = descriptor.index(&config.tag_name);
    if config.zero_destination_first {
        *record = R::zero();
    }

    // Mapping keys iterate in order, so this is the smallest unknown key.
    let mut unknown: Option<&str> = None;
    for (key, value) in mapping {
        let Some(position) = index.resolve(key) else {
            tracing::trace!(record = %R::type_name(), key = %key, "unresolved key");
            unknown.get_or_insert(key);
            continue;
        };
        descriptor.fields()[position]
            .access
            .decode(record, value, config)
            .map_err(|err| err.within(PathSegment::Field(key.clone())))?;
    }

    match unknown {
        Some(key) if !config.ignore_unknown_keys => Err(Error::new(ErrorKind::UnknownField)
            .with_message(format!("unknown field {key:?} for {}", R::type_name()))
            .within(PathSegment::Field(key.to_string()))),
        _ => Ok(()),
    }
}

/// Decodes a mapping into any destination.
///
/// Records are populated in place. A non-record destination accepts a mapping
/// with exactly one entry, whose value is converted directly.
pub fn decode_mapping<T: Coerce>(
    destination: &mut T,
    mapping: &Mapping,
    config: &DecoderConfig,
) -> Result<(), Error> {
    if T::KIND == Kind::Record {
        return destination.populate(mapping, config);
    }

    let mut entries = mapping.iter();
    match (entries.next(), entries.next()) {
        (Some((key, value)), None) => destination
            .coerce_into(value, config)
            .map_err(|err| err.within(PathSegment::Field(key.clone()))),
        _ => Err(Error::new(ErrorKind::InvalidDestination).with_message(format!(
            "cannot decode a mapping of {} entries into {}",
            mapping.len(),
            T::type_name()
        ))),
    }
}
