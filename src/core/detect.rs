//! Purpose: Classify decoder input as JSON, YAML, or an already-built mapping.
//! Exports: `Input`, `Format`, `detect`.
//! Role: Format detector in front of the parsers; never parses the document.
//! Invariants: Classification looks only at the first non-whitespace byte.
//! Invariants: Whitespace-only text is always `EmptyInput`.
use std::fmt;

use bstr::ByteSlice;

use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Mapping, Value};

/// Anything a decoder accepts as its source.
#[derive(Clone, Copy, Debug)]
pub enum Input<'a> {
    Bytes(&'a [u8]),
    Text(&'a str),
    Mapping(&'a Mapping),
    Value(&'a Value),
}

impl<'a> Input<'a> {
    /// Raw bytes for text-like input; `None` for mappings and values.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Input::Bytes(bytes) => Some(bytes),
            Input::Text(text) => Some(text.as_bytes()),
            Input::Mapping(_) | Input::Value(_) => None,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Input::Bytes(_) => "bytes",
            Input::Text(_) => "text",
            Input::Mapping(_) => "mapping",
            Input::Value(value) => value.type_name(),
        }
    }
}

impl<'a> From<&'a [u8]> for Input<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Input::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Input<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Input::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Input<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Input::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(text: &'a str) -> Self {
        Input::Text(text)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(text: &'a String) -> Self {
        Input::Text(text)
    }
}

impl<'a> From<&'a Mapping> for Input<'a> {
    fn from(mapping: &'a Mapping) -> Self {
        Input::Mapping(mapping)
    }
}

impl<'a> From<&'a Value> for Input<'a> {
    fn from(value: &'a Value) -> Self {
        Input::Value(value)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Json,
    Yaml,
    Mapping,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Mapping => "mapping",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides which parser gets the first attempt at `input`.
pub fn detect(input: Input<'_>) -> Result<Format, Error> {
    let bytes = match input {
        Input::Mapping(_) | Input::Value(Value::Mapping(_)) => return Ok(Format::Mapping),
        Input::Value(_) => return Err(unsupported_input(input)),
        Input::Bytes(bytes) => bytes,
        Input::Text(text) => text.as_bytes(),
    };

    let trimmed = bytes.trim();
    let format = match trimmed.first() {
        None => {
            return Err(Error::new(ErrorKind::EmptyInput).with_message("input is empty"));
        }
        Some(b'{' | b'[') => Format::Json,
        Some(_) => Format::Yaml,
    };
    tracing::debug!(format = %format, len = bytes.len(), "detected input format");
    Ok(format)
}

pub(crate) fn unsupported_input(input: Input<'_>) -> Error {
    Error::new(ErrorKind::UnsupportedInputType).with_message(format!(
        "unsupported input type {}; expected bytes, text, or a mapping",
        input.describe()
    ))
}
