//! Title to slug conversion

/// Slug used when a title has no ASCII letters or digits
pub const FALLBACK_SLUG: &str = "post";

/// Lowercase the title, drop everything except `a-z`, `0-9`, whitespace and
/// `-`, then join the whitespace-separated words with single hyphens.
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || is_space(*c))
        .collect();

    let slug = kept
        .split(is_space)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// ASCII whitespace plus vertical tab
fn is_space(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\x0B'
}

/// Collision breaker: `<slug>-<unix millis>`
pub fn with_suffix(slug: &str, millis: i64) -> String {
    format!("{}-{}", slug, millis)
}
