//! Purpose: Hold the options that steer one decoder.
//! Exports: `DecoderConfig`.
//! Role: Immutable value object read by every decode stage.
//! Invariants: Defaults are weak typing on, `json` tags, unknown keys ignored, zero first.
//! Invariants: A config is never mutated while a decode that borrows it is running.
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct DecoderConfig {
    /// Fall back to textual and numeric coercions when types do not match.
    pub weakly_typed: bool,
    /// Tag namespace that names fields (`json`, `yaml`, ...).
    pub tag_name: String,
    /// Tolerate document keys that resolve to no field.
    pub ignore_unknown_keys: bool,
    /// Reset the destination record before populating it.
    pub zero_destination_first: bool,
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self {
            weakly_typed: true,
            tag_name: "json".to_string(),
            ignore_unknown_keys: true,
            zero_destination_first: true,
        }
    }

    pub fn with_weakly_typed(mut self, weakly_typed: bool) -> Self {
        self.weakly_typed = weakly_typed;
        self
    }

    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = tag_name.into();
        self
    }

    pub fn with_ignore_unknown_keys(mut self, ignore: bool) -> Self {
        self.ignore_unknown_keys = ignore;
        self
    }

    pub fn with_zero_destination_first(mut self, zero_first: bool) -> Self {
        self.zero_destination_first = zero_first;
        self
    }

    /// Whether a format-native decode would produce the same outcome as the
    /// map decode engine; serde ignores unknown keys and rebuilds the whole value.
    pub(crate) fn allows_native_fast_path(&self) -> bool {
        self.ignore_unknown_keys && self.zero_destination_first
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

crate::record! {
    DecoderConfig {
        weakly_typed: r#"json:"weakly_typed" yaml:"weakly_typed""#,
        tag_name: r#"json:"tag_name" yaml:"tag_name""#,
        ignore_unknown_keys: r#"json:"ignore_unknown_keys" yaml:"ignore_unknown_keys""#,
        zero_destination_first: r#"json:"zero_destination_first" yaml:"zero_destination_first""#,
    }
}

#[cfg(test)]
mod tests {
    use super::DecoderConfig;

    #[test]
    fn defaults_match_documented_values() {
        let config = DecoderConfig::default();
        assert!(config.weakly_typed);
        assert_eq!(config.tag_name, "json");
        assert!(config.ignore_unknown_keys);
        assert!(config.zero_destination_first);
        assert!(config.allows_native_fast_path());
    }

    #[test]
    fn fast_path_requires_lenient_keys_and_fresh_destination() {
        let strict = DecoderConfig::new().with_ignore_unknown_keys(false);
        assert!(!strict.allows_native_fast_path());
        let merging = DecoderConfig::new().with_zero_destination_first(false);
        assert!(!merging.allows_native_fast_path());
    }
}
