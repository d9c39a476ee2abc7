//! Purpose: Public decode and projection entry points.
//! Exports: `Decoder`, `decode_json`, `decode_yaml`, `auto_decode`, `decode_mapping`,
//! `parse_document`, `to_map`.
//! Role: Orchestrates format detection, the native fast path, and the map decode engine.
//! Invariants: A fast-path miss is never an error; the map decode engine gets the input next.
//! Invariants: The fast path only runs when serde and the tag index agree on every key.
//! Invariants: When JSON-shaped input fails both ways, the JSON error is reported.
use serde::de::DeserializeOwned;

use crate::core::coerce::Coerce;
use crate::core::config::DecoderConfig;
use crate::core::decode;
use crate::core::detect::{Format, Input, detect, unsupported_input};
use crate::core::error::{Error, ErrorKind};
use crate::core::native;
use crate::core::project;
use crate::core::value::{Mapping, Value};
use crate::parse::{json, yaml};

pub type ApiResult<T> = Result<T, Error>;

/// A decoder bound to one configuration.
///
/// Safe to share across threads; decoding only reads the configuration.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes bytes, text, a mapping, or a projected value into `destination`.
    ///
    /// Text that does not start with `{` or `[` is tried as a YAML mapping
    /// first, then as JSON. A projected value (a record or timestamp taken
    /// from `to_map` output) converts like any other source value.
    pub fn decode<'a, T>(&self, input: impl Into<Input<'a>>, destination: &mut T) -> ApiResult<()>
    where
        T: Coerce + DeserializeOwned,
    {
        let input = input.into();
        match input {
            Input::Mapping(mapping) | Input::Value(Value::Mapping(mapping)) => {
                self.decode_mapping(mapping, destination)
            }
            Input::Value(source @ Value::Native(_)) => destination.coerce_into(source, &self.config),
            Input::Value(_) => Err(unsupported_input(input)),
            Input::Bytes(bytes) => self.decode_bytes(bytes, destination),
            Input::Text(text) => self.decode_bytes(text.as_bytes(), destination),
        }
    }

    /// Decodes YAML text; mappings and values are rejected.
    pub fn decode_yaml<'a, T>(
        &self,
        input: impl Into<Input<'a>>,
        destination: &mut T,
    ) -> ApiResult<()>
    where
        T: Coerce + DeserializeOwned,
    {
        let input = input.into();
        let Some(bytes) = input.as_bytes() else {
            return Err(unsupported_input(input));
        };
        let text = utf8(bytes)?;
        if text.trim().is_empty() {
            return Err(empty_input());
        }
        let document = yaml::parse_document(text)?;
        self.decode_document(&document, destination, || native::try_yaml(text))
    }

    pub fn decode_mapping<T: Coerce>(&self, mapping: &Mapping, destination: &mut T) -> ApiResult<()> {
        decode::decode_mapping(destination, mapping, &self.config)
    }

    /// Projects a record using this decoder's tag namespace.
    pub fn to_map<T: Coerce>(&self, value: &T) -> ApiResult<Mapping> {
        project::to_map(value, &self.config.tag_name)
    }

    fn decode_bytes<T>(&self, bytes: &[u8], destination: &mut T) -> ApiResult<()>
    where
        T: Coerce + DeserializeOwned,
    {
        if detect(Input::Bytes(bytes))? == Format::Yaml {
            let parsed =
                utf8(bytes).and_then(|text| yaml::parse_document(text).map(|document| (text, document)));
            match parsed {
                Ok((text, document)) => {
                    return self.decode_document(&document, destination, || native::try_yaml(text));
                }
                Err(_) => tracing::debug!("yaml mapping parse failed; trying json"),
            }
        }
        let document = json::parse_document(bytes)?;
        self.decode_document(&document, destination, || native::try_json(bytes))
    }

    /// Takes the serde result when it is known to match, else runs the map decode engine.
    fn decode_document<T, F>(&self, document: &Mapping, destination: &mut T, fast: F) -> ApiResult<()>
    where
        T: Coerce,
        F: FnOnce() -> Option<T>,
    {
        if native::applies::<T>(document, &self.config) {
            if let Some(value) = fast() {
                *destination = value;
                return Ok(());
            }
        }
        self.decode_mapping(document, destination)
    }
}

fn utf8(bytes: &[u8]) -> ApiResult<&str> {
    std::str::from_utf8(bytes).map_err(|err| {
        Error::new(ErrorKind::Parse)
            .with_message("input is not valid utf-8")
            .with_source(err)
    })
}

fn empty_input() -> Error {
    Error::new(ErrorKind::EmptyInput).with_message("input is empty")
}

fn yaml_decoder() -> Decoder {
    Decoder::new(DecoderConfig::new().with_tag_name("yaml"))
}

/// Decodes JSON (or YAML-looking text) with the default configuration.
pub fn decode_json<'a, T>(input: impl Into<Input<'a>>, destination: &mut T) -> ApiResult<()>
where
    T: Coerce + DeserializeOwned,
{
    Decoder::default().decode(input, destination)
}

/// Decodes YAML text, resolving fields through `yaml` tags.
pub fn decode_yaml<'a, T>(input: impl Into<Input<'a>>, destination: &mut T) -> ApiResult<()>
where
    T: Coerce + DeserializeOwned,
{
    yaml_decoder().decode_yaml(input, destination)
}

/// Detects the format of `input` and decodes it.
///
/// JSON-shaped input that fails as JSON is retried as YAML (flow style); if
/// that fails too, the JSON error is returned.
pub fn auto_decode<'a, T>(input: impl Into<Input<'a>>, destination: &mut T) -> ApiResult<()>
where
    T: Coerce + DeserializeOwned,
{
    let input = input.into();
    if input.as_bytes().is_none() {
        return Err(unsupported_input(input));
    }
    match detect(input)? {
        Format::Json => decode_json(input, destination).or_else(|json_err| {
            tracing::debug!("json decode failed; retrying as yaml");
            decode_yaml(input, destination).map_err(|_| {
                tracing::debug!("yaml retry failed; reporting json error");
                json_err
            })
        }),
        Format::Yaml => decode_yaml(input, destination),
        Format::Mapping => Err(unsupported_input(input)),
    }
}

/// Decodes an already-built mapping with the default configuration.
pub fn decode_mapping<T: Coerce>(mapping: &Mapping, destination: &mut T) -> ApiResult<()> {
    Decoder::default().decode_mapping(mapping, destination)
}

/// Parses `input` into a generic document using the same detection rules as
/// [`auto_decode`].
pub fn parse_document<'a>(input: impl Into<Input<'a>>) -> ApiResult<Mapping> {
    let input = input.into();
    let format = detect(input)?;
    let Some(bytes) = input.as_bytes() else {
        return match input {
            Input::Mapping(mapping) | Input::Value(Value::Mapping(mapping)) => Ok(mapping.clone()),
            _ => Err(unsupported_input(input)),
        };
    };
    match format {
        Format::Json => json::parse_document(bytes).or_else(|json_err| {
            utf8(bytes)
                .and_then(yaml::parse_document)
                .map_err(|_| json_err)
        }),
        _ => yaml::parse_document(utf8(bytes)?),
    }
}

/// Projects a record into a mapping keyed by its `json` tag names.
pub fn to_map<T: Coerce>(value: &T) -> ApiResult<Mapping> {
    project::to_map(value, "json")
}
