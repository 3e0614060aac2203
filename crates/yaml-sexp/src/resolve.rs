//! Typing of untagged plain scalars.
//!
//! Quoted scalars are always text. Plain scalars are tried, in order, as
//! null, bool, int, float and timestamp, and fall back to text. The word
//! lists accept the YAML 1.1 spellings (`yes`, `off`, `~`, ...) that
//! hand-written config files rely on.

use crate::value::Value;
use chrono::{NaiveDate, NaiveTime};

/// Resolve an untagged plain scalar to a typed value.
pub fn resolve_plain(s: &str) -> Value {
    if is_null(s) {
        return Value::Null;
    }
    if let Some(b) = parse_bool(s) {
        return Value::Bool(b);
    }
    if let Some(v) = parse_int(s) {
        return v;
    }
    if let Some(f) = parse_float(s) {
        return Value::Float(f);
    }
    if let Some(v) = parse_timestamp(s) {
        return v;
    }
    Value::Text(s.to_string())
}

/// Resolve a scalar carrying an explicit `tag:yaml.org,2002:` tag.
///
/// Returns `None` for core tags without a scalar meaning here (`binary`,
/// `set`, ...). A value that does not parse as its tag's type is kept as text.
pub fn resolve_core_tag(suffix: &str, s: &str) -> Option<Value> {
    let resolved = match suffix {
        "str" => None,
        "null" => is_null(s).then_some(Value::Null),
        "bool" => parse_bool(s).map(Value::Bool),
        "int" => parse_int(s),
        "float" => parse_float(s)
            .or_else(|| match parse_int(s)? {
                Value::Int(n) => Some(n as f64),
                Value::BigInt(ref digits) => digits.parse().ok(),
                _ => None,
            })
            .map(Value::Float),
        "timestamp" => parse_timestamp(s),
        _ => return None,
    };
    Some(resolved.unwrap_or_else(|| Value::Text(s.to_string())))
}

fn is_null(s: &str) -> bool {
    matches!(s, "" | "~" | "null" | "Null" | "NULL")
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => Some(true),
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => Some(false),
        _ => None,
    }
}

/// Split an optional leading `+` or `-`. Returns `(negative, rest)`.
fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

/// YAML 1.1 integers with an optional sign and `_` separators:
///
/// - binary `0b1010`, hex `0x1F`
/// - octal with a bare leading zero (`010` is 8; `09` is not an integer)
/// - decimal `0` or `[1-9][0-9_]*`
/// - sexagesimal `1:30` (90), with every group after the first in `0..60`
///
/// Values outside `i64` are kept exactly as [`Value::BigInt`].
fn parse_int(s: &str) -> Option<Value> {
    let (negative, body) = split_sign(s);
    let magnitude = if let Some(digits) = body.strip_prefix("0b") {
        radix_magnitude(digits, 2)?
    } else if let Some(digits) = body.strip_prefix("0x") {
        radix_magnitude(digits, 16)?
    } else if body.contains(':') {
        sexagesimal_magnitude(body)?
    } else if body.starts_with('0') {
        radix_magnitude(body, 8)?
    } else if body.starts_with(|c: char| matches!(c, '1'..='9')) {
        radix_magnitude(body, 10)?
    } else {
        return None;
    };
    Some(magnitude.into_value(negative))
}

/// Digits of one radix mixed with `_`. At least one digit is required.
fn radix_magnitude(digits: &str, radix: u32) -> Option<Magnitude> {
    let mut magnitude = Magnitude::default();
    let mut seen_digit = false;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        magnitude.push_digit(radix, c.to_digit(radix)?);
        seen_digit = true;
    }
    seen_digit.then_some(magnitude)
}

/// `[1-9][0-9_]*(:[0-5]?[0-9])+`
fn sexagesimal_magnitude(body: &str) -> Option<Magnitude> {
    let mut groups = body.split(':');
    let head = groups.next()?;
    if !head.starts_with(|c: char| matches!(c, '1'..='9')) {
        return None;
    }
    let mut magnitude = radix_magnitude(head, 10)?;
    for group in groups {
        magnitude.push_digit(60, base60_digit(group)?);
    }
    Some(magnitude)
}

/// One sexagesimal group after the first: `[0-5]?[0-9]`.
fn base60_digit(group: &str) -> Option<u32> {
    match group.as_bytes() {
        [d @ b'0'..=b'9'] => Some(u32::from(d - b'0')),
        [t @ b'0'..=b'5', d @ b'0'..=b'9'] => Some(u32::from(t - b'0') * 10 + u32::from(d - b'0')),
        _ => None,
    }
}

/// Unbounded non-negative integer, little-endian limbs in base 10^9.
#[derive(Default)]
struct Magnitude {
    limbs: Vec<u32>,
}

const LIMB_BASE: u64 = 1_000_000_000;

impl Magnitude {
    /// `self = self * radix + digit`
    fn push_digit(&mut self, radix: u32, digit: u32) {
        let mut carry = u64::from(digit);
        for limb in &mut self.limbs {
            let v = u64::from(*limb) * u64::from(radix) + carry;
            *limb = (v % LIMB_BASE) as u32;
            carry = v / LIMB_BASE;
        }
        while carry > 0 {
            self.limbs.push((carry % LIMB_BASE) as u32);
            carry /= LIMB_BASE;
        }
    }

    fn to_decimal(&self) -> String {
        let mut limbs = self.limbs.iter().rev().skip_while(|&&l| l == 0);
        let Some(top) = limbs.next() else {
            return "0".to_string();
        };
        let mut text = top.to_string();
        for limb in limbs {
            text.push_str(&format!("{limb:09}"));
        }
        text
    }

    fn into_value(self, negative: bool) -> Value {
        let digits = self.to_decimal();
        let signed = if negative && digits != "0" {
            format!("-{digits}")
        } else {
            digits
        };
        match signed.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::BigInt(signed),
        }
    }
}

/// YAML 1.1 floats:
///
/// - `[-+]?[0-9][0-9_]*.[0-9_]*` with an optional signed exponent (`6.02e+23`)
/// - unsigned `.[0-9_]+` with an optional signed exponent (`.5`, but not `-.5`)
/// - sexagesimal `[-+]?[0-9][0-9_]*(:[0-5]?[0-9])+.[0-9_]*` (`1:30.5` is 90.5)
/// - `[-+]?.inf` and unsigned `.nan`, in the three usual capitalisations
///
/// An unsigned exponent (`1.5e3`) or a missing `.` (`1e5`) is not a float.
fn parse_float(s: &str) -> Option<f64> {
    let (negative, body) = split_sign(s);
    let signed = body.len() != s.len();
    match body {
        ".inf" | ".Inf" | ".INF" => {
            return Some(if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            })
        }
        ".nan" | ".NaN" | ".NAN" if !signed => return Some(f64::NAN),
        _ => {}
    }

    let magnitude = if body.contains(':') {
        sexagesimal_float(body)?
    } else {
        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(i) => (&body[..i], Some(&body[i + 1..])),
            None => (body, None),
        };
        let (int_part, frac_part) = mantissa.split_once('.')?;
        if int_part.is_empty() {
            if signed || !frac_part.bytes().any(|b| b.is_ascii_digit()) {
                return None;
            }
        } else if !int_part.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        if !is_digits_or_underscores(int_part) || !is_digits_or_underscores(frac_part) {
            return None;
        }
        if let Some(exp) = exponent {
            let digits = exp.strip_prefix(['+', '-'])?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
        }
        let clean: String = body.chars().filter(|&c| c != '_').collect();
        clean.parse::<f64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// `[0-9][0-9_]*(:[0-5]?[0-9])+.[0-9_]*`; the last group carries the fraction.
fn sexagesimal_float(body: &str) -> Option<f64> {
    let mut groups: Vec<&str> = body.split(':').collect();
    let last = groups.pop()?;
    let head = groups.first()?;
    if !head.starts_with(|c: char| c.is_ascii_digit()) || !is_digits_or_underscores(head) {
        return None;
    }
    let (whole, frac) = last.split_once('.')?;
    if !is_digits_or_underscores(frac) {
        return None;
    }
    let mut value: f64 = head.replace('_', "").parse().ok()?;
    for group in &groups[1..] {
        value = value * 60.0 + f64::from(base60_digit(group)?);
    }
    let tail: f64 = format!("{}.{}0", base60_digit(whole)?, frac.replace('_', ""))
        .parse()
        .ok()?;
    Some(value * 60.0 + tail)
}

fn is_digits_or_underscores(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit() || b == b'_')
}

/// Recognise a YAML timestamp.
///
/// - `YYYY-MM-DD` → [`Value::Date`]
/// - `YYYY-M-D` followed by `T`/`t` or blanks, `H:MM:SS`, an optional
///   fraction and an optional `Z` / `±HH[:MM]` offset → [`Value::DateTime`]
///   holding the fields as written
///
/// Calendar-invalid dates (`2024-02-30`) are rejected.
pub fn parse_timestamp(s: &str) -> Option<Value> {
    let mut cur = Cursor::new(s);
    let year = cur.digits(4, 4)?;
    cur.expect(b'-')?;
    let month = cur.digits(1, 2)?;
    cur.expect(b'-')?;
    let day = cur.digits(1, 2)?;

    if cur.at_end() {
        // Date-only form requires two-digit month and day.
        if s.len() != 10 {
            return None;
        }
        return NaiveDate::from_ymd_opt(year as i32, month, day).map(Value::Date);
    }

    if !(cur.eat(b'T') || cur.eat(b't')) && cur.skip_blanks() == 0 {
        return None;
    }
    let hour = cur.digits(1, 2)?;
    cur.expect(b':')?;
    let minute = cur.digits(2, 2)?;
    cur.expect(b':')?;
    let second = cur.digits(2, 2)?;

    let mut nanos = 0;
    if cur.eat(b'.') {
        let frac = cur.take_digits();
        let mut scale = 100_000_000;
        for b in frac.bytes().take(9) {
            nanos += u32::from(b - b'0') * scale;
            scale /= 10;
        }
    }

    cur.skip_blanks();
    if !cur.at_end() && !cur.eat(b'Z') {
        if !(cur.eat(b'+') || cur.eat(b'-')) {
            return None;
        }
        cur.digits(1, 2)?;
        if cur.eat(b':') {
            cur.digits(2, 2)?;
        }
    }
    if !cur.at_end() {
        return None;
    }

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;
    Some(Value::DateTime(date.and_time(time)))
}

/// Byte cursor over an ASCII timestamp candidate.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: u8) -> Option<()> {
        self.eat(b).then_some(())
    }

    fn skip_blanks(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.bytes.get(self.pos), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn take_digits(&mut self) -> &'a str {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        // Only ASCII digits were consumed, so the slice is valid UTF-8.
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or_default()
    }

    /// Read between `min` and `max` ASCII digits as a number.
    fn digits(&mut self, min: usize, max: usize) -> Option<u32> {
        let start = self.pos;
        let mut value = 0u32;
        while self.pos - start < max {
            match self.bytes.get(self.pos) {
                Some(b) if b.is_ascii_digit() => {
                    value = value * 10 + u32::from(b - b'0');
                    self.pos += 1;
                }
                _ => break,
            }
        }
        (self.pos - start >= min).then_some(value)
    }
}
