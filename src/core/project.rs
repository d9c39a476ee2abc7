//! Purpose: Project a populated record back into a generic mapping.
//! Exports: `record_map`, `to_map`.
//! Role: Reverse projector; shares tag rules with the field resolver.
//! Invariants: Excluded fields never appear; omit-empty fields are skipped when zero.
//! Invariants: Nested records stay records in the output (no flattening).
use crate::core::coerce::Coerce;
use crate::core::error::{Error, ErrorKind};
use crate::core::record::{Descriptor, Record};
use crate::core::value::Mapping;

pub fn record_map<R: Record>(record: &R, tag_name: &str) -> Mapping {
    let descriptor = Descriptor::<R>::of();
    let index = descriptor.index(tag_name);
    let mut out = Mapping::new();
    for (position, field) in descriptor.fields().iter().enumerate() {
        let Some(key) = index.key(position) else {
            continue;
        };
        if key.omit_empty && field.access.is_zero(record) {
            continue;
        }
        out.entry(key.name.clone())
            .or_insert_with(|| field.access.project(record));
    }
    out
}

/// Projects `value`, or the record behind one `Option`/`Box` layer.
pub fn to_map<T: Coerce>(value: &T, tag_name: &str) -> Result<Mapping, Error> {
    value
        .record_map(tag_name)
        .or_else(|| value.pointee_record_map(tag_name))
        .ok_or_else(|| {
            Error::new(ErrorKind::NotAStruct)
                .with_message(format!("expected a record, got {}", T::type_name()))
        })
}

#[cfg(test)]
mod tests {
    use super::to_map;
    use crate::core::error::ErrorKind;
    use crate::core::value::Value;

    #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
    struct Inner {
        value: String,
    }

    crate::record! { Inner { value: r#"json:"value""# } }

    #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
    struct Outer {
        id: i32,
        note: String,
        hidden: bool,
        inner: Inner,
    }

    crate::record! {
        Outer {
            id: r#"json:"id""#,
            note: r#"json:"note,omitempty""#,
            hidden: r#"json:"-""#,
            inner,
        }
    }

    #[test]
    fn honors_exclusion_and_omit_empty() {
        let outer = Outer {
            id: 1,
            hidden: true,
            ..Outer::default()
        };
        let map = to_map(&outer, "json").unwrap();
        assert_eq!(map.get("id"), Some(&Value::Int(1)));
        assert!(!map.contains_key("note"));
        assert!(!map.contains_key("hidden"));
        assert!(map.contains_key("inner"));
    }

    #[test]
    fn nested_records_are_kept_whole() {
        let outer = Outer {
            inner: Inner {
                value: "deep".to_string(),
            },
            ..Outer::default()
        };
        let map = to_map(&outer, "json").unwrap();
        let inner = map.get("inner").unwrap().downcast_ref::<Inner>().unwrap();
        assert_eq!(inner.value, "deep");
    }

    #[test]
    fn dereferences_one_pointer_layer() {
        let boxed = Some(Box::new(Inner::default()));
        assert_eq!(to_map(&Box::new(Inner::default()), "json").unwrap().len(), 1);
        let err = to_map(&boxed, "json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAStruct);
    }

    #[test]
    fn non_records_are_rejected() {
        assert_eq!(to_map(&5i32, "json").unwrap_err().kind(), ErrorKind::NotAStruct);
        assert_eq!(to_map(&None::<Inner>, "json").unwrap_err().kind(), ErrorKind::NotAStruct);
    }
}
