//! Purpose: Define the stable public Rust API boundary for weakdecode.
//! Exports: Decode entry points, configuration, records, value tree, and errors.
//! Role: Public, additive-only surface; hides parser and engine internals.
//! Invariants: This module is the only public path to decoding and projection.
//! Invariants: Internal modules remain private and are not directly exposed.

mod decoder;

pub use crate::core::coerce::{Coerce, Kind, coerce_value};
pub use crate::core::config::DecoderConfig;
pub use crate::core::detect::{Format, Input, detect};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Conversion, Error, ErrorKind, PathSegment};
pub use crate::core::record::{Fields, Record};
pub use crate::core::tag::{StructTag, TagSpec};
pub use crate::core::value::{Mapping, NativeValue, Value};
pub use decoder::{
    ApiResult, Decoder, auto_decode, decode_json, decode_mapping, decode_yaml, parse_document,
    to_map,
};
