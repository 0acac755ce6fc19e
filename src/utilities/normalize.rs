use std::sync::LazyLock;

use htmlentity::entity::{decode, ICodedDataTrait};
use regex::Regex;
use serde_json::Value;

static LEADING_SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\p{L}\p{N}_\s]+").expect("valid leading symbols regex"));

static PRICE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,]*").expect("valid price regex"));

/// Splits a category label like `"🍔 Lanches"` into `("🍔", "Lanches")`.
pub fn split_category(label: &str, default_emoji: &str, default_name: &str) -> (String, String) {
    let label = clean_text(label);

    let (emoji, rest) = match LEADING_SYMBOLS.find(&label) {
        Some(m) => (m.as_str().trim(), &label[m.end()..]),
        None => ("", label.as_str()),
    };

    let emoji = if emoji.is_empty() { default_emoji } else { emoji };
    let name = rest.trim();
    let name = if name.is_empty() { default_name } else { name };

    (emoji.to_string(), name.to_string())
}

/// `12.5` -> `"R$ 12,50"`. No thousands separator.
pub fn format_price(value: f64, currency_prefix: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{} {:.2}", currency_prefix, value).replace('.', ",")
}

/// Reads the first number in a displayed price (`"R$ 1.234,56"`, `"12.90"`, `"A partir de R$ 9,90"`).
pub fn parse_price_text(text: &str) -> Option<f64> {
    let raw = PRICE_NUMBER.find(text)?.as_str().trim_end_matches(['.', ',']);

    let normalized = if raw.contains(',') {
        raw.replace('.', "").replace(',', ".")
    } else if raw.matches('.').count() > 1 || is_grouped_thousands(raw) {
        // "1.500" and "1.234.567" are thousands-grouped integers
        raw.replace('.', "")
    } else {
        raw.to_string()
    };

    normalized.parse::<f64>().ok()
}

fn is_grouped_thousands(raw: &str) -> bool {
    match raw.split_once('.') {
        Some((_, decimals)) => decimals.len() == 3 && decimals.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Price from a JSON field: number, numeric string, or 0.
pub fn price_from_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .or_else(|| parse_price_text(s))
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Decodes HTML entities, collapses whitespace and trims.
pub fn clean_text(text: &str) -> String {
    let decoded = if text.contains('&') {
        decode(text.as_bytes())
            .to_string()
            .unwrap_or_else(|_| text.to_string())
    } else {
        text.to_string()
    };

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Protocol-relative URLs (`//cdn...`) get an https scheme.
pub fn absolutize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}
