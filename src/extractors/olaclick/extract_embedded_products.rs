use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static PRODUCTS_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']products["']\s*:\s*\["#).expect("valid products key regex")
});

/// Finds a `"products": [...]` array embedded in the page's hydration state
/// (`window.__NUXT__`, inline JSON, ...) and parses it.
///
/// Every occurrence is tried; the first one that parses to a non-empty
/// array wins.
pub fn extract_embedded_products(html_content: &str) -> Option<Vec<Value>> {
    PRODUCTS_KEY.find_iter(html_content).find_map(|m| {
        // The match ends just after the opening bracket
        let start = m.end() - 1;
        let array = balanced_array(&html_content[start..])?;

        match serde_json::from_str::<Value>(array) {
            Ok(Value::Array(products)) if !products.is_empty() => Some(products),
            Ok(_) => None,
            Err(e) => {
                println!("Embedded products block is not valid JSON: {}", e);
                None
            }
        }
    })
}

/// Returns the slice from the leading `[` to its matching `]`, skipping
/// brackets inside string literals.
fn balanced_array(source: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (index, ch) in source.char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => in_string = Some(ch),
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&source[..index + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_array_from_nuxt_state() {
        let html = r#"<html><script>window.__NUXT__={"store":{"products":[{"name":"Pastel [queijo]","price":9.5,"category":{"name":"Salgados"}},{"name":"Caldo \"verde\"","price":12}],"other":[1]}}</script></html>"#;

        let products = extract_embedded_products(html).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0]["name"], "Pastel [queijo]");
        assert_eq!(products[1]["name"], "Caldo \"verde\"");
    }

    #[test]
    fn skips_empty_and_invalid_occurrences() {
        let html = r#"
            <script>var a = {'products': [bad js, here]};</script>
            <script>var b = {"products": []};</script>
            <script>var c = {"products" : [{"name": "Coxinha", "price": 7}]};</script>
        "#;

        let products = extract_embedded_products(html).unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], "Coxinha");
    }

    #[test]
    fn returns_none_without_products() {
        assert!(extract_embedded_products("<html><body>Sem cardápio</body></html>").is_none());
        assert!(extract_embedded_products(r#"{"products": [{"name": "cortado""#).is_none());
    }

    #[test]
    fn balances_nested_structures() {
        assert_eq!(balanced_array(r#"[[1,2],{"a":[3]}] trailing"#), Some(r#"[[1,2],{"a":[3]}]"#));
        assert_eq!(balanced_array("[1, 2"), None);
    }
}
