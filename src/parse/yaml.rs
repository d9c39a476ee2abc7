//! Purpose: YAML decode entrypoints for the fast path and the document tree.
//! Exports: `from_str`, `parse_document`.
//! Invariants: Scalar keys are rendered to text; sequence or mapping keys are rejected.
//! Invariants: Tagged values (`!tag value`) decode as their inner value.
use serde::de::DeserializeOwned;

use super::{location_hint, root_mapping};
use crate::core::error::{Error, ErrorKind};
use crate::core::value::{Mapping, Value};

pub(crate) fn from_str<T: DeserializeOwned>(text: &str) -> Result<T, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

pub(crate) fn parse_document(text: &str) -> Result<Mapping, Error> {
    let root = serde_yaml::from_str::<serde_yaml::Value>(text).map_err(parse_error)?;
    root_mapping(convert(root)?, "yaml")
}

fn convert(value: serde_yaml::Value) -> Result<Value, Error> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(value) => Value::Bool(value),
        serde_yaml::Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                Value::Int(value)
            } else if let Some(value) = number.as_u64() {
                Value::Uint(value)
            } else {
                Value::Float(number.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_yaml::Value::String(text) => Value::String(text),
        serde_yaml::Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_yaml::Value::Mapping(entries) => {
            let mut mapping = Mapping::new();
            for (key, value) in entries {
                mapping.insert(key_text(key)?, convert(value)?);
            }
            Value::Mapping(mapping)
        }
        serde_yaml::Value::Tagged(tagged) => convert(tagged.value)?,
    })
}

fn key_text(key: serde_yaml::Value) -> Result<String, Error> {
    match key {
        serde_yaml::Value::String(text) => Ok(text),
        serde_yaml::Value::Bool(value) => Ok(value.to_string()),
        serde_yaml::Value::Number(number) => Ok(number.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => key_text(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err(Error::new(ErrorKind::Parse).with_message("yaml mapping keys must be scalars"))
        }
    }
}

fn parse_error(err: serde_yaml::Error) -> Error {
    let mut error = Error::new(ErrorKind::Parse).with_message(format!("invalid yaml: {err}"));
    if let Some(location) = err.location() {
        error = error.with_hint(location_hint(location.line(), location.column()));
    }
    error.with_source(err)
}

#[cfg(test)]
mod tests {
    use super::parse_document;
    use crate::core::error::ErrorKind;
    use crate::core::value::Value;

    #[test]
    fn block_and_flow_styles_parse() {
        let block = parse_document("id: \"42\"\nactive: yes\ntags: [a, b]\n").unwrap();
        assert_eq!(block.get("id"), Some(&Value::from("42")));
        assert_eq!(block.get("active"), Some(&Value::from("yes")));

        let flow = parse_document("{id: 1, name: x}").unwrap();
        assert_eq!(flow.get("id"), Some(&Value::Int(1)));
        assert_eq!(flow.get("name"), Some(&Value::from("x")));
    }

    #[test]
    fn scalar_keys_become_text() {
        let mapping = parse_document("1: one\ntrue: yes\n").unwrap();
        assert_eq!(mapping.get("1"), Some(&Value::from("one")));
        assert!(mapping.contains_key("true"));
    }

    #[test]
    fn complex_keys_are_rejected() {
        let err = parse_document("? [a, b]\n: value\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn tags_are_transparent() {
        let mapping = parse_document("name: !custom plain\n").unwrap();
        assert_eq!(mapping.get("name"), Some(&Value::from("plain")));
    }

    #[test]
    fn empty_document_and_scalar_roots() {
        assert!(parse_document("# only a comment\n").unwrap().is_empty());
        let err = parse_document("just text").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn syntax_errors_carry_location() {
        let err = parse_document("a: [1, 2\nb: 3\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.hint().is_some_and(|hint| hint.starts_with("line ")));
    }
}
