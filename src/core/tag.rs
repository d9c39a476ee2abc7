//! Purpose: Read serialization tags written in `key:"value" key2:"value2"` form.
//! Exports: `StructTag`, `TagSpec`.
//! Role: Tag syntax layer under the field resolver and the reverse projector.
//! Invariants: Lookup never fails; malformed tag text simply yields no value.
//! Invariants: A tag value of exactly `-` marks the field as excluded.

/// Raw tag text attached to a record field.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StructTag<'a>(pub &'a str);

impl<'a> StructTag<'a> {
    /// Returns the unquoted value stored under `key`, if any.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let mut rest = self.0;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                return None;
            }

            let name_len = rest
                .char_indices()
                .find(|(_, ch)| *ch <= ' ' || *ch == ':' || *ch == '"' || *ch == '\x7f')
                .map_or(rest.len(), |(idx, _)| idx);
            if name_len == 0 || !rest[name_len..].starts_with(":\"") {
                return None;
            }
            let name = &rest[..name_len];
            rest = &rest[name_len + 2..];

            let (raw, after) = split_quoted(rest)?;
            rest = after;
            if name == key {
                return Some(unescape(raw));
            }
        }
    }
}

/// Finds the closing quote, honoring backslash escapes.
fn split_quoted(text: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some((&text[..idx], &text[idx + 1..])),
            _ => escaped = false,
        }
    }
    None
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Parsed tag value: a name followed by comma-separated options.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagSpec {
    name: String,
    options: Vec<String>,
    excluded: bool,
}

impl TagSpec {
    pub fn parse(value: &str) -> Self {
        let mut parts = value.split(',');
        let name = parts.next().unwrap_or_default().to_string();
        Self {
            excluded: value == "-",
            name,
            options: parts.map(str::to_string).collect(),
        }
    }

    /// The explicit name, or `None` when the tag leaves naming to the field.
    pub fn name(&self) -> Option<&str> {
        if self.excluded || self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|candidate| candidate == option)
    }

    pub fn omit_empty(&self) -> bool {
        self.has_option("omitempty")
    }
}

#[cfg(test)]
mod tests {
    use super::{StructTag, TagSpec};

    #[test]
    fn lookup_finds_each_namespace() {
        let tag = StructTag(r#"json:"id,omitempty" yaml:"ident""#);
        assert_eq!(tag.lookup("json").as_deref(), Some("id,omitempty"));
        assert_eq!(tag.lookup("yaml").as_deref(), Some("ident"));
        assert_eq!(tag.lookup("toml"), None);
    }

    #[test]
    fn lookup_handles_escapes_and_extra_spaces() {
        let tag = StructTag(r#"  a:"x\"y"   b:"" "#);
        assert_eq!(tag.lookup("a").as_deref(), Some("x\"y"));
        assert_eq!(tag.lookup("b").as_deref(), Some(""));
    }

    #[test]
    fn malformed_tag_yields_nothing() {
        assert_eq!(StructTag("json").lookup("json"), None);
        assert_eq!(StructTag(r#"json:"unterminated"#).lookup("json"), None);
        assert_eq!(StructTag("").lookup("json"), None);
    }

    #[test]
    fn spec_parses_name_and_options() {
        let spec = TagSpec::parse("custom,omitempty");
        assert_eq!(spec.name(), Some("custom"));
        assert!(spec.omit_empty());
        assert!(!spec.is_excluded());

        let unnamed = TagSpec::parse(",omitempty");
        assert_eq!(unnamed.name(), None);
        assert!(unnamed.omit_empty());
    }

    #[test]
    fn only_a_bare_dash_excludes() {
        assert!(TagSpec::parse("-").is_excluded());
        let dash_named = TagSpec::parse("-,");
        assert!(!dash_named.is_excluded());
        assert_eq!(dash_named.name(), Some("-"));
    }
}
