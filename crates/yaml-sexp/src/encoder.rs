//! S-expression encoder — converts a [`Value`] tree into text a Lisp reader can consume.
//!
//! The output is a single line with no layout. Rules, by value shape:
//!
//! - **Mappings**: each pair becomes `(prefix:key value)`, pairs joined by spaces,
//!   with no parens of their own (the enclosing list supplies them)
//! - **Lists of records**: every element is a mapping → `(prefix:item pairs...)` per element
//! - **Other lists**: `(e1 e2 ...)`
//! - **Text**: short identifier-like strings become quoted symbols (`'Alice`);
//!   everything else is a double-quoted, escaped string literal
//! - **Scalars**: `#t`/`#f`, decimal integers, `+nan.0`/`+inf.0`/`-inf.0`, `nil`
//! - **Dates**: `(make-date 2024 03 07)`; a date-time keeps only its date
//! - Empty mappings and empty lists are both `()`
//!
//! The whole document is wrapped in one extra pair of parens.
//!
//! # Example
//! ```
//! use yaml_sexp::{encode, Value};
//! let doc = Value::mapping([("name", Value::from("Alice")), ("age", Value::from(30))]);
//! assert_eq!(encode(&doc), "((yaml:name 'Alice) (yaml:age 30))");
//! ```

use crate::stack::ensure_sufficient_stack;
use crate::value::Value;
use chrono::{Datelike, NaiveDate};

/// Key prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "yaml";

/// Longest string (in characters) that may be emitted as a bare symbol.
const MAX_SYMBOL_LEN: usize = 20;

/// Encode a value with the default `yaml` key prefix.
pub fn encode(root: &Value) -> String {
    Encoder::default().encode(root)
}

/// Converts [`Value`] trees to s-expression text.
///
/// Holds only the key prefix, fixed at construction, so one encoder can be
/// shared freely across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    key_prefix: String,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::with_key_prefix(DEFAULT_KEY_PREFIX)
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder that writes mapping keys as `<prefix>:<key>`.
    pub fn with_key_prefix(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
        }
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Encode a whole document: the fragment for `root`, wrapped in parens.
    pub fn encode(&self, root: &Value) -> String {
        let mut out = String::from("(");
        self.encode_value(root, &mut out);
        out.push(')');
        tracing::debug!(
            key_prefix = %self.key_prefix,
            root = root.type_name(),
            bytes = out.len(),
            "encoded document"
        );
        out
    }

    /// Encode a value without the document-level parens.
    pub fn encode_fragment(&self, value: &Value) -> String {
        let mut out = String::new();
        self.encode_value(value, &mut out);
        out
    }

    /// Type dispatch. Containers recurse; the stack grows on demand so deep
    /// trees cannot overflow it.
    fn encode_value(&self, value: &Value, out: &mut String) {
        ensure_sufficient_stack(|| match value {
            Value::Mapping(pairs) => self.encode_mapping(pairs, out),
            Value::Sequence(items) => self.encode_sequence(items, out),
            Value::Text(s) => encode_text(s, out),
            Value::Bool(b) => out.push_str(if *b { "#t" } else { "#f" }),
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::BigInt(digits) => out.push_str(digits),
            Value::Float(f) => out.push_str(&format_float(*f)),
            Value::Date(d) => out.push_str(&format_date(*d)),
            Value::DateTime(dt) => out.push_str(&format_date(dt.date())),
            Value::Null => out.push_str("nil"),
            Value::Opaque(s) => push_string_literal(s, out),
        })
    }

    /// Emit `(prefix:key value)` per pair, space separated, no enclosing parens.
    fn encode_mapping(&self, pairs: &[(String, Value)], out: &mut String) {
        if pairs.is_empty() {
            out.push_str("()");
            return;
        }
        for (i, (key, value)) in pairs.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push('(');
            self.push_prefixed(key, out);
            out.push(' ');
            self.encode_value(value, out);
            out.push(')');
        }
    }

    /// Lists of records become `(prefix:item ...)` entries with no outer parens.
    /// Anything else is a plain parenthesised list. A mapping inside a mixed
    /// list still emits bare pairs, so its pairs sit directly in that list.
    fn encode_sequence(&self, items: &[Value], out: &mut String) {
        if items.is_empty() {
            out.push_str("()");
            return;
        }
        if is_list_of_records(items) {
            for (i, record) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                out.push('(');
                self.push_prefixed("item", out);
                out.push(' ');
                self.encode_value(record, out);
                out.push(')');
            }
        } else {
            out.push('(');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                self.encode_value(item, out);
            }
            out.push(')');
        }
    }

    fn push_prefixed(&self, name: &str, out: &mut String) {
        out.push_str(&self.key_prefix);
        out.push(':');
        out.push_str(name);
    }
}

/// True when the list is non-empty and every element is a mapping.
fn is_list_of_records(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_mapping)
}

/// Symbols are emitted bare behind a quote; everything else is a string literal.
/// A symbol never contains a character that would need escaping.
fn encode_text(s: &str, out: &mut String) {
    if is_symbol(s) {
        out.push('\'');
        out.push_str(s);
    } else {
        push_string_literal(s, out);
    }
}

fn push_string_literal(s: &str, out: &mut String) {
    out.push('"');
    push_escaped(s, out);
    out.push('"');
}

/// Test whether a string can be written as a bare quoted symbol.
///
/// The string must be 1 to 20 characters long and match one of:
/// - an uppercase letter followed by 4 to 6 digits (`A1234`)
/// - 2 or 3 uppercase letters (`AB`, `ABC`)
/// - an identifier: `^[A-Za-z_][A-Za-z0-9_]*$`
///
/// The last shape covers the first two; all three are checked anyway so the
/// accepted set stays exactly the union.
pub fn is_symbol(s: &str) -> bool {
    let len = s.chars().count();
    if len == 0 || len > MAX_SYMBOL_LEN {
        return false;
    }
    is_code_symbol(s) || is_uppercase_abbrev(s) || is_identifier(s)
}

/// `^[A-Z][0-9]{4,6}$`
fn is_code_symbol(s: &str) -> bool {
    let bytes = s.as_bytes();
    (5..=7).contains(&bytes.len())
        && bytes[0].is_ascii_uppercase()
        && bytes[1..].iter().all(u8::is_ascii_digit)
}

/// `^[A-Z]{2,3}$`
fn is_uppercase_abbrev(s: &str) -> bool {
    let bytes = s.as_bytes();
    (2..=3).contains(&bytes.len()) && bytes.iter().all(u8::is_ascii_uppercase)
}

/// `^[A-Za-z_][A-Za-z0-9_]*$`
fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Escape a string for use between double quotes.
///
/// `"` and `\` are backslash-escaped, newline/CR/tab use `\n`, `\r`, `\t`,
/// and every other control character (U+0000–U+001F, U+007F) becomes `\xHH`
/// in lowercase hex. Non-ASCII text passes through untouched.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    push_escaped(s, &mut out);
    out
}

fn push_escaped(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
}

/// Lisp reader notation for non-finite floats; otherwise the shortest text
/// that reads back to the same `f64`. `{:?}` always keeps a `.` or exponent,
/// so `1.0` stays a float on the other side.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "+nan.0".to_string()
    } else if f == f64::INFINITY {
        "+inf.0".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf.0".to_string()
    } else {
        format!("{:?}", f)
    }
}

fn format_date(d: NaiveDate) -> String {
    format!("(make-date {} {:02} {:02})", d.year(), d.month(), d.day())
}
