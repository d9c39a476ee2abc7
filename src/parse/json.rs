//! Purpose: JSON decode entrypoints for the fast path and the document tree.
//! Exports: `from_slice`, `parse_document`.
//! Notes: Error mapping for `from_slice` is left to callsites; misses there are not fatal.
use serde::de::DeserializeOwned;

use super::{location_hint, root_mapping};
use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Mapping, Value};

pub(crate) fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}

pub(crate) fn parse_document(bytes: &[u8]) -> Result<Mapping, Error> {
    let root = serde_json::from_slice::<serde_json::Value>(bytes).map_err(parse_error)?;
    root_mapping(Value::from(root), "json")
}

fn parse_error(err: serde_json::Error) -> Error {
    let mut error = Error::new(ErrorKind::Parse).with_message(format!("invalid json: {err}"));
    if err.line() > 0 {
        error = error.with_hint(location_hint(err.line(), err.column()));
    }
    error.with_source(err)
}
