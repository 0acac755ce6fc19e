use std::sync::LazyLock;

use regex::Regex;

use crate::utilities::normalize::{absolutize_url, clean_text};

static STYLE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background(?:-image)?\s*:[^;]*?url\(\s*(?:&quot;|["'])?(?P<url>[^"')]*?)(?:&quot;|["'])?\s*\)"#)
        .expect("valid style url regex")
});

/// Extracts the image URL from an inline style such as
/// `background-image: url("https://cdn/x.jpg")`.
pub fn extract_style_url(style: &str) -> Option<String> {
    let url = STYLE_URL.captures(style)?.name("url")?.as_str();
    let url = clean_text(url);

    if url.is_empty() {
        None
    } else {
        Some(absolutize_url(&url))
    }
}
