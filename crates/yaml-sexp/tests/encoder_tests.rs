/// Encoder contract tests: every value shape and the exact text it produces.
///
/// Values are built by hand so these tests exercise the encoder alone, with
/// no YAML parsing involved.
use chrono::NaiveDate;
use yaml_sexp::{encode, escape_string, is_symbol, Encoder, Value};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Encode without the document-level parens.
fn fragment(value: &Value) -> String {
    Encoder::default().encode_fragment(value)
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn encode_null() {
    assert_eq!(fragment(&Value::Null), "nil");
}

#[test]
fn encode_bools() {
    assert_eq!(fragment(&Value::Bool(true)), "#t");
    assert_eq!(fragment(&Value::Bool(false)), "#f");
}

#[test]
fn encode_integers() {
    assert_eq!(fragment(&Value::Int(42)), "42");
    assert_eq!(fragment(&Value::Int(-7)), "-7");
    assert_eq!(fragment(&Value::Int(0)), "0");
    assert_eq!(fragment(&Value::Int(1_000_000)), "1000000");
    assert_eq!(fragment(&Value::Int(i64::MIN)), "-9223372036854775808");
}

#[test]
fn encode_big_integers_verbatim() {
    let big = Value::BigInt("12345678901234567890".to_string());
    assert_eq!(fragment(&big), "12345678901234567890");
    let doc = Value::mapping([("n", Value::BigInt("-99999999999999999999".to_string()))]);
    assert_eq!(encode(&doc), "((yaml:n -99999999999999999999))");
}

#[test]
fn encode_float_special_values() {
    assert_eq!(fragment(&Value::Float(f64::NAN)), "+nan.0");
    assert_eq!(fragment(&Value::Float(f64::INFINITY)), "+inf.0");
    assert_eq!(fragment(&Value::Float(f64::NEG_INFINITY)), "-inf.0");
}

#[test]
fn encode_floats_keep_float_syntax() {
    assert_eq!(fragment(&Value::Float(3.14)), "3.14");
    assert_eq!(fragment(&Value::Float(1.0)), "1.0");
    assert_eq!(fragment(&Value::Float(-0.5)), "-0.5");
    assert_eq!(fragment(&Value::Float(1e20)), "1e20");
}

#[test]
fn encode_floats_read_back_exactly() {
    for f in [0.1, 1.0 / 3.0, 6.02214076e23, -2.5e-8, f64::MAX, f64::MIN_POSITIVE] {
        let text = fragment(&Value::Float(f));
        assert_eq!(text.parse::<f64>().unwrap(), f, "{text} does not read back");
    }
}

#[test]
fn encode_date() {
    assert_eq!(
        fragment(&Value::Date(date(2024, 3, 7))),
        "(make-date 2024 03 07)"
    );
    assert_eq!(
        fragment(&Value::Date(date(1999, 12, 31))),
        "(make-date 1999 12 31)"
    );
}

#[test]
fn encode_datetime_drops_time_of_day() {
    let dt = date(2024, 3, 7).and_hms_opt(23, 59, 58).unwrap();
    assert_eq!(fragment(&Value::DateTime(dt)), "(make-date 2024 03 07)");
}

#[test]
fn encode_opaque_is_always_quoted() {
    // Even identifier-shaped text stays a string literal.
    assert_eq!(fragment(&Value::Opaque("hello".into())), r#""hello""#);
    assert_eq!(fragment(&Value::Opaque("a\"b".into())), r#""a\"b""#);
}

// ============================================================================
// Text: symbols vs. string literals
// ============================================================================

#[test]
fn encode_identifier_text_as_symbol() {
    assert_eq!(fragment(&Value::from("Alice")), "'Alice");
    assert_eq!(fragment(&Value::from("snake_case_1")), "'snake_case_1");
    assert_eq!(fragment(&Value::from("_private")), "'_private");
}

#[test]
fn encode_code_and_abbrev_as_symbol() {
    assert_eq!(fragment(&Value::from("A1234")), "'A1234");
    assert_eq!(fragment(&Value::from("Z123456")), "'Z123456");
    assert_eq!(fragment(&Value::from("AB")), "'AB");
    assert_eq!(fragment(&Value::from("XYZ")), "'XYZ");
}

#[test]
fn encode_text_with_space_as_string() {
    assert_eq!(fragment(&Value::from("hello world")), r#""hello world""#);
}

#[test]
fn encode_empty_text_as_string() {
    assert_eq!(fragment(&Value::from("")), r#""""#);
}

#[test]
fn encode_text_starting_with_digit_as_string() {
    assert_eq!(fragment(&Value::from("1abc")), r#""1abc""#);
    assert_eq!(fragment(&Value::from("42")), r#""42""#);
}

#[test]
fn encode_long_identifier_as_string() {
    let twenty = "abcdefghijklmnopqrst";
    let twenty_one = "abcdefghijklmnopqrstu";
    assert_eq!(fragment(&Value::from(twenty)), format!("'{twenty}"));
    assert_eq!(fragment(&Value::from(twenty_one)), format!("\"{twenty_one}\""));
}

#[test]
fn encode_hyphenated_text_as_string() {
    assert_eq!(fragment(&Value::from("kebab-case")), r#""kebab-case""#);
}

#[test]
fn encode_non_ascii_text_unescaped() {
    assert_eq!(fragment(&Value::from("caf\u{e9}")), "\"caf\u{e9}\"");
    assert_eq!(fragment(&Value::from("\u{4f60}\u{597d}")), "\"\u{4f60}\u{597d}\"");
}

// ============================================================================
// Escaping
// ============================================================================

#[test]
fn escape_quotes_and_backslashes() {
    assert_eq!(escape_string(r#"say "hi""#), r#"say \"hi\""#);
    assert_eq!(escape_string(r"C:\path\to"), r"C:\\path\\to");
}

#[test]
fn escape_named_control_characters() {
    assert_eq!(escape_string("a\nb"), r"a\nb");
    assert_eq!(escape_string("a\rb"), r"a\rb");
    assert_eq!(escape_string("a\tb"), r"a\tb");
}

#[test]
fn escape_other_control_characters_as_hex() {
    assert_eq!(escape_string("\u{0}"), r"\x00");
    assert_eq!(escape_string("\u{1b}[0m"), r"\x1b[0m");
    assert_eq!(escape_string("\u{1f}"), r"\x1f");
    assert_eq!(escape_string("\u{7f}"), r"\x7f");
}

#[test]
fn escape_leaves_c1_and_unicode_alone() {
    assert_eq!(escape_string("\u{80}\u{e9}\u{2028}"), "\u{80}\u{e9}\u{2028}");
}

#[test]
fn encode_string_literal_is_escaped() {
    assert_eq!(
        fragment(&Value::from("line1\nline2 \"q\"")),
        r#""line1\nline2 \"q\"""#
    );
}

// ============================================================================
// Symbol classification
// ============================================================================

#[test]
fn symbol_length_bounds() {
    assert!(!is_symbol(""));
    assert!(is_symbol("a"));
    assert!(is_symbol(&"a".repeat(20)));
    assert!(!is_symbol(&"a".repeat(21)));
}

#[test]
fn symbol_rejects_non_ascii_letters() {
    assert!(!is_symbol("caf\u{e9}"));
    assert!(!is_symbol("\u{e9}t\u{e9}"));
}

#[test]
fn symbol_rejects_trailing_newline() {
    assert!(!is_symbol("abc\n"));
}

#[test]
fn symbol_rejects_punctuation() {
    for s in ["a.b", "a-b", "a b", "a:b", "'a", "a\"", "(a)", "#t"] {
        assert!(!is_symbol(s), "{s:?} should not be a symbol");
    }
}

// ============================================================================
// Mappings
// ============================================================================

#[test]
fn encode_flat_mapping() {
    let doc = Value::mapping([("name", Value::from("Alice")), ("age", Value::from(30))]);
    assert_eq!(fragment(&doc), "(yaml:name 'Alice) (yaml:age 30)");
    assert_eq!(encode(&doc), "((yaml:name 'Alice) (yaml:age 30))");
}

#[test]
fn encode_empty_mapping() {
    let empty = Value::Mapping(Vec::new());
    assert_eq!(fragment(&empty), "()");
    assert_eq!(encode(&empty), "(())");
}

#[test]
fn encode_nested_mapping_is_bare_pairs() {
    let doc = Value::mapping([(
        "server",
        Value::mapping([("host", Value::from("localhost")), ("port", Value::from(8080))]),
    )]);
    assert_eq!(
        fragment(&doc),
        "(yaml:server (yaml:host 'localhost) (yaml:port 8080))"
    );
}

#[test]
fn encode_empty_mapping_as_value() {
    let doc = Value::mapping([("opts", Value::Mapping(Vec::new()))]);
    assert_eq!(fragment(&doc), "(yaml:opts ())");
}

#[test]
fn encode_mapping_preserves_insertion_order() {
    let doc = Value::mapping([("z", 1), ("a", 2), ("m", 3)]);
    assert_eq!(fragment(&doc), "(yaml:z 1) (yaml:a 2) (yaml:m 3)");
}

#[test]
fn mapping_duplicate_key_keeps_first_position() {
    let doc = Value::mapping([("a", 1), ("b", 2), ("a", 3)]);
    assert_eq!(fragment(&doc), "(yaml:a 3) (yaml:b 2)");
}

#[test]
fn insert_reports_replaced_value() {
    let mut doc = Value::mapping([("a", 1)]);
    assert_eq!(doc.insert("b", 2), None);
    assert_eq!(doc.insert("a", 3), Some(Value::Int(1)));
    assert_eq!(fragment(&doc), "(yaml:a 3) (yaml:b 2)");
}

#[test]
#[should_panic(expected = "cannot insert a key into a sequence")]
fn insert_into_non_mapping_panics() {
    let mut list = Value::from(vec![1, 2]);
    list.insert("a", 1);
}

#[test]
fn encode_keys_are_not_escaped_or_classified() {
    let doc = Value::mapping([("first name", Value::Null)]);
    assert_eq!(fragment(&doc), "(yaml:first name nil)");
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn encode_scalar_list() {
    let list = Value::Sequence(vec![Value::from(1), Value::from("a b"), Value::from(true)]);
    assert_eq!(fragment(&list), r#"(1 "a b" #t)"#);
}

#[test]
fn encode_empty_sequence() {
    assert_eq!(fragment(&Value::Sequence(Vec::new())), "()");
    let doc = Value::mapping([("tags", Value::Sequence(Vec::new()))]);
    assert_eq!(fragment(&doc), "(yaml:tags ())");
}

#[test]
fn encode_list_of_records() {
    let list = Value::Sequence(vec![
        Value::mapping([("id", 1)]),
        Value::mapping([("id", 2)]),
    ]);
    assert_eq!(
        fragment(&list),
        "(yaml:item (yaml:id 1)) (yaml:item (yaml:id 2))"
    );
}

#[test]
fn encode_list_of_records_under_key() {
    let doc = Value::mapping([(
        "users",
        Value::Sequence(vec![
            Value::mapping([("name", "Ann"), ("role", "admin")]),
            Value::mapping([("name", "Bob"), ("role", "dev")]),
        ]),
    )]);
    assert_eq!(
        encode(&doc),
        "((yaml:users (yaml:item (yaml:name 'Ann) (yaml:role 'admin)) \
         (yaml:item (yaml:name 'Bob) (yaml:role 'dev))))"
    );
}

#[test]
fn encode_list_of_empty_records() {
    let list = Value::Sequence(vec![Value::Mapping(Vec::new())]);
    assert_eq!(fragment(&list), "(yaml:item ())");
}

#[test]
fn encode_nested_scalar_lists() {
    let list: Value = vec![vec![1, 2], vec![3]].into();
    assert_eq!(fragment(&list), "((1 2) (3))");
}

#[test]
fn encode_mixed_list_mapping_emits_bare_pairs() {
    // A mapping among scalars has no parens of its own, so its pairs land
    // directly inside the list. Kept as-is: readers see `(1 (yaml:a 2))`.
    let list = Value::Sequence(vec![Value::from(1), Value::mapping([("a", 2)])]);
    assert_eq!(fragment(&list), "(1 (yaml:a 2))");

    let two_pairs = Value::Sequence(vec![
        Value::from("x"),
        Value::mapping([("a", 1), ("b", 2)]),
    ]);
    assert_eq!(fragment(&two_pairs), "('x (yaml:a 1) (yaml:b 2))");
}

#[test]
fn encode_top_level_scalar_list() {
    let list = Value::Sequence(vec![Value::from(1), Value::from(2)]);
    assert_eq!(encode(&list), "((1 2))");
}

#[test]
fn encode_top_level_scalar_is_wrapped() {
    assert_eq!(encode(&Value::from("hello")), "('hello)");
    assert_eq!(encode(&Value::Int(5)), "(5)");
}

// ============================================================================
// Conversions into Value
// ============================================================================

#[test]
fn iterables_become_sequences() {
    let set: std::collections::BTreeSet<i64> = [3, 1, 2].into_iter().collect();
    let value: Value = set.into_iter().collect();
    assert_eq!(fragment(&value), "(1 2 3)");
}

#[test]
fn options_become_null_or_value() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::from("x"));
}

#[test]
fn json_values_convert_in_order() {
    let json = serde_json::json!({"b": 1, "a": [true, null, 1.5], "c": {"d": "e f"}});
    let value = Value::from(json);
    assert_eq!(
        fragment(&value),
        r#"(yaml:b 1) (yaml:a (#t nil 1.5)) (yaml:c (yaml:d "e f"))"#
    );
}

#[test]
fn json_large_unsigned_stays_exact() {
    let value = Value::from(serde_json::json!(u64::MAX));
    assert_eq!(value, Value::BigInt("18446744073709551615".to_string()));
    assert_eq!(fragment(&value), "18446744073709551615");
}

// ============================================================================
// Encoder configuration
// ============================================================================

#[test]
fn default_prefix_is_yaml() {
    assert_eq!(Encoder::new().key_prefix(), "yaml");
    assert_eq!(Encoder::default(), Encoder::new());
}

#[test]
fn custom_prefix_applies_to_keys_and_items() {
    let encoder = Encoder::with_key_prefix("cfg");
    let doc = Value::mapping([("rows", Value::Sequence(vec![Value::mapping([("id", 1)])]))]);
    assert_eq!(encoder.encode(&doc), "((cfg:rows (cfg:item (cfg:id 1))))");
}

#[test]
fn encoding_is_deterministic() {
    let doc = Value::mapping([
        ("a", Value::from(vec![Value::from(1.5), Value::from("x y")])),
        ("b", Value::Date(date(2020, 1, 2))),
    ]);
    let encoder = Encoder::new();
    assert_eq!(encoder.encode(&doc), encoder.encode(&doc));
}

#[test]
fn encoder_is_shareable_across_threads() {
    let encoder = std::sync::Arc::new(Encoder::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let encoder = encoder.clone();
            std::thread::spawn(move || encoder.encode(&Value::mapping([("n", i)])))
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("((yaml:n {i}))"));
    }
}

#[test]
fn encode_deeply_nested_sequence_does_not_overflow() {
    let mut value = Value::Int(0);
    for _ in 0..100_000 {
        value = Value::Sequence(vec![value]);
    }
    let text = encode(&value);
    assert_eq!(text.len(), 1 + 2 * 100_000 + 1 + 1);
    assert!(text.starts_with("(((("));
}

#[test]
fn deeply_nested_values_clone_compare_and_drop() {
    let mut value = Value::Null;
    for i in 0..100_000 {
        value = if i % 2 == 0 {
            Value::Sequence(vec![value, Value::Int(i)])
        } else {
            Value::mapping([("k", value)])
        };
    }
    let copy = value.clone();
    assert_eq!(copy, value);
    drop(copy);
    drop(value);
}
