//! Purpose: Render a document tree as pretty JSON with optional ANSI colorization.
//! Exports: colorize_value.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: When color is disabled, output equals serde_json::to_string_pretty of the tree.
//! Invariants: Native values render through their plain view.
use weakdecode::{Mapping, Value};

const INDENT: &str = "  ";

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";

pub fn colorize_value(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, 0, use_color, &mut out);
    out
}

fn write_value(value: &Value, indent: usize, use_color: bool, out: &mut String) {
    match value {
        Value::Null => push_colored("null", COLOR_NULL, use_color, out),
        Value::Bool(val) => {
            let text = if *val { "true" } else { "false" };
            push_colored(text, COLOR_BOOL, use_color, out);
        }
        Value::Int(num) => push_colored(&num.to_string(), COLOR_NUMBER, use_color, out),
        Value::Uint(num) => push_colored(&num.to_string(), COLOR_NUMBER, use_color, out),
        // Non-finite floats have no JSON form; serde_json writes them as null.
        Value::Float(num) => match serde_json::Number::from_f64(*num) {
            Some(num) => push_colored(&num.to_string(), COLOR_NUMBER, use_color, out),
            None => push_colored("null", COLOR_NULL, use_color, out),
        },
        Value::String(text) => push_string(text, COLOR_STRING, use_color, out),
        Value::Sequence(items) => write_sequence(items, indent, use_color, out),
        Value::Mapping(mapping) => write_mapping(mapping, indent, use_color, out),
        Value::Native(native) => write_value(&native.plain(), indent, use_color, out),
    }
}

fn write_sequence(items: &[Value], indent: usize, use_color: bool, out: &mut String) {
    if items.is_empty() {
        push_colored("[]", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("[", COLOR_PUNCT, use_color, out);
    out.push('\n');
    for (idx, item) in items.iter().enumerate() {
        push_indent(indent + 1, out);
        write_value(item, indent + 1, use_color, out);
        if idx + 1 < items.len() {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("]", COLOR_PUNCT, use_color, out);
}

fn write_mapping(mapping: &Mapping, indent: usize, use_color: bool, out: &mut String) {
    if mapping.is_empty() {
        push_colored("{}", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("{", COLOR_PUNCT, use_color, out);
    out.push('\n');
    let len = mapping.len();
    for (idx, (key, value)) in mapping.iter().enumerate() {
        push_indent(indent + 1, out);
        push_string(key, COLOR_KEY, use_color, out);
        push_colored(":", COLOR_PUNCT, use_color, out);
        out.push(' ');
        write_value(value, indent + 1, use_color, out);
        if idx + 1 < len {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

fn push_string(text: &str, color: &str, use_color: bool, out: &mut String) {
    let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
    push_colored(&encoded, color, use_color, out);
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}

#[cfg(test)]
mod tests {
    use super::colorize_value;
    use weakdecode::{Mapping, NativeValue, Value};

    fn sample() -> Value {
        let mut nested = Mapping::new();
        nested.insert("x".to_string(), Value::from("y"));
        let mut root = Mapping::new();
        root.insert(
            "arr".to_string(),
            Value::from(vec![Value::Int(1), Value::Bool(true), Value::Null, Value::Float(2.5)]),
        );
        root.insert("big".to_string(), Value::Uint(u64::MAX));
        root.insert("nested".to_string(), Value::Mapping(nested));
        Value::Mapping(root)
    }

    #[test]
    fn plain_output_matches_serde_pretty() {
        let value = sample();
        let plain = colorize_value(&value, false);
        let pretty = serde_json::to_string_pretty(&value).expect("pretty");
        assert_eq!(plain, pretty);
    }

    #[test]
    fn emits_ansi_when_enabled() {
        let colored = colorize_value(&sample(), true);
        assert!(colored.contains("\u{1b}[36m\"nested\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"y\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[39mnull\u{1b}[0m"));
    }

    #[test]
    fn natives_render_plainly() {
        let stamp = time::macros::datetime!(2024-01-02 3:04:05 UTC);
        let value = Value::Native(NativeValue::new(stamp));
        assert_eq!(colorize_value(&value, false), "\"2024-01-02T03:04:05Z\"");
    }
}
