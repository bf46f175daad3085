use std::cmp::Ordering;

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Coerces a loosely-typed stat value the way JavaScript's `Number()` does, with any
/// non-finite result mapped to 0.
pub fn to_num(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_numeric_str(s),
        Some(Value::Bool(true)) => 1.0,
        Some(Value::Array(items)) => match items.as_slice() {
            [] => 0.0,
            [only] => single_element_num(only),
            _ => 0.0,
        },
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

// `[x]` coerces through the element's string form.
fn single_element_num(item: &Value) -> f64 {
    match item {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_numeric_str(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [only] => single_element_num(only),
            _ => 0.0,
        },
        _ => 0.0,
    }
}

fn parse_numeric_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(n) = parse_radix_literal(trimmed) {
        return n;
    }
    // Rust accepts "inf"/"nan" spellings that a stat column never means.
    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
    {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(0.0)
}

// Unsigned `0x`/`0o`/`0b` integer literals.
fn parse_radix_literal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    Some(
        digits
            .chars()
            .try_fold(0.0_f64, |acc, c| {
                c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
            })
            .unwrap_or(f64::NAN),
    )
}

pub fn display_num(n: f64) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{n}")
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Attribute-value escaping: only double quotes are rewritten.
pub fn escape_attr(raw: &str) -> String {
    raw.replace('"', "&quot;")
}

pub fn initials(escaped_name: &str) -> String {
    escaped_name
        .chars()
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Collation order: base letters, then accents, then case (lowercase first), then code
/// points.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let (ka, kb) = (CollationKey::new(a), CollationKey::new(b));
    ka.primary
        .cmp(&kb.primary)
        .then_with(|| ka.accents.cmp(&kb.accents))
        .then_with(|| ka.cases.cmp(&kb.cases))
        .then_with(|| a.cmp(b))
}

// Marker standing in for the stroke or ligature of letters NFD leaves whole.
const STROKE_MARK: char = '\u{0335}';

#[derive(Default)]
struct CollationKey {
    primary: Vec<char>,
    accents: Vec<Vec<char>>,
    cases: Vec<u8>,
}

impl CollationKey {
    fn new(s: &str) -> Self {
        let mut key = CollationKey::default();
        for c in s.nfd() {
            if is_combining_mark(c) {
                match key.accents.last_mut() {
                    Some(marks) => marks.push(c),
                    None => key.accents.push(vec![c]),
                }
                continue;
            }
            key.cases.push(u8::from(c.is_uppercase()));
            match undecomposed_base(c) {
                Some(base) => {
                    key.primary.extend(base.chars());
                    key.accents.push(vec![STROKE_MARK]);
                }
                None => {
                    key.primary.extend(c.to_lowercase());
                    key.accents.push(Vec::new());
                }
            }
        }
        key
    }
}

fn undecomposed_base(c: char) -> Option<&'static str> {
    let base = match c {
        'Ł' | 'ł' => "l",
        'Ø' | 'ø' => "o",
        'Đ' | 'đ' | 'Ð' | 'ð' => "d",
        'Ħ' | 'ħ' => "h",
        'ı' => "i",
        'ß' => "ss",
        'Æ' | 'æ' => "ae",
        'Œ' | 'œ' => "oe",
        _ => return None,
    };
    Some(base)
}
