//! Document loading — YAML or JSON text into a [`Value`].
//!
//! YAML is read through the `yaml-rust2` event parser and the tree is built
//! directly from events, so quoted scalars stay text while plain scalars go
//! through [`resolve_plain`](crate::resolve::resolve_plain). Beyond plain
//! parsing the loader handles:
//!
//! - **Anchors and aliases**: an alias is a deep copy of its anchored node
//! - **Merge keys**: `<<: *base` or `<<: [*a, *b]`; explicit keys override
//!   merged ones and earlier merge sources override later ones
//! - **Duplicate keys**: the last value wins, at the first key's position
//! - **Tags**: `!!str`, `!!int`, ... force a type; application tags (`!foo`)
//!   yield [`Value::Opaque`]
//! - **Collection tags**: `!!set` loads as a sequence of its keys, and
//!   `!!omap`/`!!pairs` as a sequence of `[key, value]` pairs
//! - **Keys**: a scalar key is named after its resolved value (see
//!   [`key_text`]), so `on:` is the key `True` and `0x10:` the key `16`
//!
//! A stream with no document, or whose document is null, is rejected with
//! [`SexpError::EmptyDocument`] before it can reach the encoder.

use crate::error::{Result, SexpError};
use crate::resolve::{resolve_core_tag, resolve_plain};
use crate::value::Value;
use chrono::Timelike;
use std::collections::HashMap;
use std::path::Path;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Handle of the YAML core schema tags (`!!str` expands to this + `str`).
const CORE_TAG_HANDLE: &str = "tag:yaml.org,2002:";

/// Source format of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// JSON for a `.json` extension, YAML otherwise.
    #[default]
    Auto,
    Yaml,
    Json,
}

impl InputFormat {
    /// Resolve `Auto` against a path's extension.
    pub fn for_path(self, path: &Path) -> InputFormat {
        match self {
            InputFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
                _ => InputFormat::Yaml,
            },
            explicit => explicit,
        }
    }
}

/// Read and decode a file.
///
/// A missing path is reported as [`SexpError::InputNotFound`], distinct from
/// other read failures.
pub fn load_path(path: &Path, format: InputFormat) -> Result<Value> {
    let src = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SexpError::InputNotFound(path.to_path_buf())
        } else {
            SexpError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    tracing::debug!(path = %path.display(), bytes = src.len(), "read input");
    load_source(&src, format.for_path(path))
}

/// Decode text in the given format. `Auto` means YAML.
pub fn load_source(src: &str, format: InputFormat) -> Result<Value> {
    match format {
        InputFormat::Json => load_json_str(src),
        InputFormat::Yaml | InputFormat::Auto => load_str(src),
    }
}

/// Decode a single-document JSON string.
pub fn load_json_str(src: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(src)?;
    non_empty(json.into())
}

/// Decode a single-document YAML string.
pub fn load_str(src: &str) -> Result<Value> {
    let mut builder = TreeBuilder::default();
    let mut parser = Parser::new(src.chars());
    parser.load(&mut builder, true)?;
    if let Some(err) = builder.error {
        return Err(err);
    }
    let mut documents = builder.documents;
    tracing::debug!(documents = documents.len(), "parsed YAML stream");
    match documents.len() {
        0 => Err(SexpError::EmptyDocument),
        1 => non_empty(documents.remove(0)),
        n => Err(SexpError::MultipleDocuments(n)),
    }
}

fn non_empty(root: Value) -> Result<Value> {
    if root.is_null() {
        Err(SexpError::EmptyDocument)
    } else {
        Ok(root)
    }
}

/// A node that has been fully read, waiting to be attached to its parent.
struct Node {
    value: Value,
    /// Untagged plain `<<`.
    is_merge_key: bool,
}

/// Core collection tags that change the shape of the loaded container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectionTag {
    /// `!!set`: a mapping whose keys are the members.
    Set,
    /// `!!omap` / `!!pairs`: a sequence of one-pair mappings.
    Pairs,
}

impl CollectionTag {
    fn from_tag(tag: Option<&Tag>) -> Option<Self> {
        let tag = tag.filter(|t| is_core_handle(&t.handle))?;
        match tag.suffix.as_str() {
            "set" => Some(CollectionTag::Set),
            "omap" | "pairs" => Some(CollectionTag::Pairs),
            _ => None,
        }
    }
}

/// A completed mapping entry. `key` is the resolved key node, kept for
/// `!!set` members and `!!omap` pairs; `text` is its rendered form.
struct Entry {
    text: String,
    key: Value,
    value: Value,
}

/// An open container.
enum Frame {
    Sequence {
        anchor: usize,
        tag: Option<CollectionTag>,
        items: Vec<Value>,
    },
    Mapping {
        anchor: usize,
        tag: Option<CollectionTag>,
        line: usize,
        entries: Vec<Entry>,
        merges: Vec<Value>,
        pending: Option<PendingKey>,
    },
}

enum PendingKey {
    Plain { text: String, key: Value },
    Merge,
}

/// Builds [`Value`] trees from parser events. Event callbacks cannot fail,
/// so the first error is parked in `error` and later events are ignored.
#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    anchors: HashMap<usize, Value>,
    documents: Vec<Value>,
    error: Option<SexpError>,
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.handle(ev, mark.line()) {
            self.error = Some(err);
        }
    }
}

impl TreeBuilder {
    fn handle(&mut self, ev: Event, line: usize) -> Result<()> {
        match ev {
            Event::Scalar(raw, style, anchor, tag) => {
                let is_plain = matches!(style, TScalarStyle::Plain);
                let is_merge_key = is_plain && tag.is_none() && raw == "<<";
                let value = resolve_scalar(&raw, is_plain, tag.as_ref());
                self.register_anchor(anchor, &value);
                self.complete(
                    Node {
                        value,
                        is_merge_key,
                    },
                    line,
                )
            }
            Event::Alias(id) => {
                let value = self
                    .anchors
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| structure(line, "alias refers to an unknown anchor"))?;
                self.complete(
                    Node {
                        value,
                        is_merge_key: false,
                    },
                    line,
                )
            }
            Event::SequenceStart(anchor, tag) => {
                self.stack.push(Frame::Sequence {
                    anchor,
                    tag: CollectionTag::from_tag(tag.as_ref()),
                    items: Vec::new(),
                });
                Ok(())
            }
            Event::MappingStart(anchor, tag) => {
                self.stack.push(Frame::Mapping {
                    anchor,
                    tag: CollectionTag::from_tag(tag.as_ref()),
                    line,
                    entries: Vec::new(),
                    merges: Vec::new(),
                    pending: None,
                });
                Ok(())
            }
            Event::SequenceEnd | Event::MappingEnd => {
                let (anchor, value) = match self.stack.pop() {
                    Some(Frame::Sequence { anchor, items, .. }) => {
                        (anchor, Value::Sequence(items))
                    }
                    Some(Frame::Mapping {
                        anchor,
                        tag,
                        line: start,
                        entries,
                        merges,
                        ..
                    }) => {
                        let value = if tag == Some(CollectionTag::Set) {
                            set_members(entries)
                        } else if self.in_pairs_sequence() {
                            single_pair(entries, start)?
                        } else {
                            build_mapping(entries, merges, start)?
                        };
                        (anchor, value)
                    }
                    None => return Err(structure(line, "unbalanced container end")),
                };
                self.register_anchor(anchor, &value);
                self.complete(
                    Node {
                        value,
                        is_merge_key: false,
                    },
                    line,
                )
            }
            _ => Ok(()),
        }
    }

    /// Whether the innermost open container is an `!!omap`/`!!pairs` sequence.
    fn in_pairs_sequence(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Frame::Sequence {
                tag: Some(CollectionTag::Pairs),
                ..
            })
        )
    }

    fn register_anchor(&mut self, anchor: usize, value: &Value) {
        if anchor > 0 {
            tracing::trace!(anchor, kind = value.type_name(), "registered anchor");
            self.anchors.insert(anchor, value.clone());
        }
    }

    /// Attach a finished node to the open container, or close the document.
    fn complete(&mut self, node: Node, line: usize) -> Result<()> {
        match self.stack.last_mut() {
            None => {
                self.documents.push(node.value);
                Ok(())
            }
            Some(Frame::Sequence { items, .. }) => {
                items.push(node.value);
                Ok(())
            }
            Some(Frame::Mapping {
                entries,
                merges,
                pending,
                ..
            }) => {
                match pending.take() {
                    None if node.is_merge_key => *pending = Some(PendingKey::Merge),
                    None => {
                        let text = key_text(&node.value)
                            .ok_or_else(|| structure(line, "mapping keys must be scalars"))?;
                        *pending = Some(PendingKey::Plain {
                            text,
                            key: node.value,
                        });
                    }
                    Some(PendingKey::Plain { text, key }) => entries.push(Entry {
                        text,
                        key,
                        value: node.value,
                    }),
                    Some(PendingKey::Merge) => merges.push(node.value),
                }
                Ok(())
            }
        }
    }
}

fn is_core_handle(handle: &str) -> bool {
    // `!!` may arrive expanded or as the bare shorthand handle.
    handle == CORE_TAG_HANDLE || handle == "!!"
}

/// Resolve a scalar's type from its style and tag.
fn resolve_scalar(raw: &str, is_plain: bool, tag: Option<&Tag>) -> Value {
    match tag {
        None if is_plain => resolve_plain(raw),
        None => Value::Text(raw.to_string()),
        Some(tag) if is_core_handle(&tag.handle) => {
            resolve_core_tag(&tag.suffix, raw).unwrap_or_else(|| Value::Opaque(raw.to_string()))
        }
        // Non-specific `!` tag: a plain string.
        Some(tag) if tag.handle == "!" && tag.suffix.is_empty() => Value::Text(raw.to_string()),
        Some(_) => Value::Opaque(raw.to_string()),
    }
}

/// Text of a scalar used as a mapping key, rendered from its resolved value
/// the way a Python loader prints it: `True`/`False`, `None`, decimal
/// integers (`0x10` → `16`) and Python float reprs (`1.0`, `1e+16`, `inf`).
///
/// Returns `None` for sequences and mappings.
pub fn key_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => float_key_text(*f),
        Value::BigInt(s) | Value::Text(s) | Value::Opaque(s) => s.clone(),
        Value::Date(d) => d.to_string(),
        Value::DateTime(dt) => {
            let mut text = dt.format("%Y-%m-%d %H:%M:%S").to_string();
            let micros = dt.nanosecond() / 1_000;
            if micros != 0 {
                text.push_str(&format!(".{micros:06}"));
            }
            text
        }
        Value::Sequence(_) | Value::Mapping(_) => return None,
    };
    Some(text)
}

/// Shortest round-trip digits, positional for exponents in `-4..16` and
/// scientific (`1e+16`, `1.5e-05`) outside it.
fn float_key_text(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|&c| c != '.').collect();
    let body = if (-4..16).contains(&exp) {
        if exp < 0 {
            format!("0.{}{digits}", "0".repeat((-exp - 1) as usize))
        } else {
            let point = exp as usize + 1;
            if digits.len() <= point {
                format!("{digits}{}.0", "0".repeat(point - digits.len()))
            } else {
                format!("{}.{}", &digits[..point], &digits[point..])
            }
        }
    } else {
        let (head, tail) = digits.split_at(1);
        let sign = if exp < 0 { '-' } else { '+' };
        if tail.is_empty() {
            format!("{head}e{sign}{:02}", exp.abs())
        } else {
            format!("{head}.{tail}e{sign}{:02}", exp.abs())
        }
    };
    if f.is_sign_negative() {
        format!("-{body}")
    } else {
        body
    }
}

/// `!!set`: the keys in source order, first occurrence kept.
fn set_members(entries: Vec<Entry>) -> Value {
    let mut seen: Vec<String> = Vec::with_capacity(entries.len());
    let mut members = Vec::with_capacity(entries.len());
    for Entry { text, key, .. } in entries {
        if !seen.contains(&text) {
            seen.push(text);
            members.push(key);
        }
    }
    Value::Sequence(members)
}

/// An `!!omap`/`!!pairs` item: a one-pair mapping becomes `[key, value]`.
fn single_pair(entries: Vec<Entry>, line: usize) -> Result<Value> {
    let mut entries = entries.into_iter();
    match (entries.next(), entries.next()) {
        (Some(Entry { key, value, .. }), None) => Ok(Value::Sequence(vec![key, value])),
        _ => Err(structure(
            line,
            "ordered map entries must be single-pair mappings",
        )),
    }
}

/// Assemble a mapping: merged pairs first, explicit pairs on top.
///
/// Merge sources listed earlier take precedence, so they are applied last.
fn build_mapping(entries: Vec<Entry>, merges: Vec<Value>, line: usize) -> Result<Value> {
    let mut merged: Vec<(String, Value)> = Vec::new();
    for mut source in merges {
        match &mut source {
            Value::Mapping(src_pairs) => merged.append(src_pairs),
            Value::Sequence(items) => {
                let mut sources = Vec::with_capacity(items.len());
                for item in items.iter_mut() {
                    match item {
                        Value::Mapping(src_pairs) => sources.push(std::mem::take(src_pairs)),
                        other => {
                            return Err(SexpError::Structure {
                                line,
                                message: format!(
                                    "merge list entries must be mappings, found {}",
                                    other.type_name()
                                ),
                            })
                        }
                    }
                }
                merged.extend(sources.into_iter().rev().flatten());
            }
            other => {
                return Err(SexpError::Structure {
                    line,
                    message: format!(
                        "merge value must be a mapping or a list of mappings, found {}",
                        other.type_name()
                    ),
                })
            }
        }
    }
    if !merged.is_empty() {
        tracing::trace!(line, merged = merged.len(), "applied merge keys");
    }
    let explicit = entries.into_iter().map(|e| (e.text, e.value));
    Ok(Value::mapping(merged.into_iter().chain(explicit)))
}

fn structure(line: usize, message: &str) -> SexpError {
    SexpError::Structure {
        line,
        message: message.to_string(),
    }
}
