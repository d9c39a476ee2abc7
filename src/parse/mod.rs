//! Purpose: Internal parsing boundary between raw text and the document tree.
//! Exports: `json` and `yaml` modules with typed and generic decode helpers.
//! Role: Single seam for parser crates so decode paths avoid ad hoc parsing.
//! Invariants: Generic documents always have a mapping root (`null` becomes empty).
//! Invariants: Parser errors surface as `ErrorKind::Parse` with the parser error as source.

pub(crate) mod json;
pub(crate) mod yaml;

use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Mapping, Value};

fn root_mapping(root: Value, format: &str) -> Result<Mapping, Error> {
    match root {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(Error::new(ErrorKind::Parse).with_message(format!(
            "{format} document root must be a mapping, got {}",
            other.type_name()
        ))),
    }
}

fn location_hint(line: usize, column: usize) -> String {
    format!("line {line}, column {column}")
}
