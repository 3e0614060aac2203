//! # yaml-sexp
//!
//! Converts YAML (or JSON) documents into s-expressions a Lisp reader can consume.
//!
//! Mapping keys become prefixed symbols (`yaml:name`), lists of records become
//! `yaml:item` entries, short identifier-like strings become quoted symbols and
//! everything else becomes an escaped string literal. Dates are written as
//! `(make-date Y MM DD)` calls.
//!
//! ## Quick start
//!
//! ```rust
//! use yaml_sexp::{encode, load_str};
//!
//! let value = load_str("name: Alice\nage: 30\n").unwrap();
//! assert_eq!(encode(&value), "((yaml:name 'Alice) (yaml:age 30))");
//! ```
//!
//! ## Modules
//!
//! - [`encoder`] — `Value` → s-expression text (never fails)
//! - [`loader`] — YAML/JSON text or files → `Value`
//! - [`resolve`] — typing of plain YAML scalars (null, bool, int, float, timestamp)
//! - [`value`] — the `Value` data model
//! - [`error`] — error types for loading

pub mod encoder;
pub mod error;
pub mod loader;
pub mod resolve;
mod stack;
pub mod value;

pub use encoder::{encode, escape_string, is_symbol, Encoder, DEFAULT_KEY_PREFIX};
pub use error::SexpError;
pub use loader::{load_json_str, load_path, load_source, load_str, InputFormat};
pub use value::Value;
