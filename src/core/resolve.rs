//! Purpose: Map document keys to record fields for one tag namespace.
//! Exports: `FieldIndex`, `FieldKey`.
//! Role: Field resolver shared by the map decode engine and the reverse projector.
//! Invariants: Built purely from field names and tags; never from document contents.
//! Invariants: Lookup is exact tag/declared name first, then case-insensitive field name.
use std::collections::HashMap;

use crate::core::tag::{StructTag, TagSpec};

/// Output name and projection options of one field in one namespace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldKey {
    pub name: String,
    pub omit_empty: bool,
}

#[derive(Clone, Debug, Default)]
pub struct FieldIndex {
    by_name: HashMap<String, usize>,
    by_folded: HashMap<String, usize>,
    keys: Vec<Option<FieldKey>>,
}

impl FieldIndex {
    /// Builds the index from `(declared name, raw tag)` pairs in declaration order.
    pub fn build<'a, I>(fields: I, tag_name: &str) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut index = FieldIndex::default();
        for (position, (declared, raw_tag)) in fields.into_iter().enumerate() {
            let spec = StructTag(raw_tag).lookup(tag_name).map(|value| TagSpec::parse(&value));
            if spec.as_ref().is_some_and(TagSpec::is_excluded) {
                index.keys.push(None);
                continue;
            }

            let name = spec
                .as_ref()
                .and_then(TagSpec::name)
                .unwrap_or(declared)
                .to_string();
            // First declaration wins when two fields claim the same key.
            index.by_name.entry(name.clone()).or_insert(position);
            index
                .by_folded
                .entry(declared.to_lowercase())
                .or_insert(position);
            index.keys.push(Some(FieldKey {
                name,
                omit_empty: spec.as_ref().is_some_and(TagSpec::omit_empty),
            }));
        }
        index
    }

    /// Position of the field a document key populates, if any.
    pub fn resolve(&self, key: &str) -> Option<usize> {
        self.by_name
            .get(key)
            .or_else(|| self.by_folded.get(&key.to_lowercase()))
            .copied()
    }

    /// Position of the field whose tag or declared name is exactly `key`.
    pub fn resolve_exact(&self, key: &str) -> Option<usize> {
        self.by_name.get(key).copied()
    }

    /// Output key for the field at `position`; `None` when excluded.
    pub fn key(&self, position: usize) -> Option<&FieldKey> {
        self.keys.get(position).and_then(Option::as_ref)
    }
}
