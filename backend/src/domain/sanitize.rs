//! Text sanitisation for free-form applicant input.

use std::sync::OnceLock;

use regex::Regex;

static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_RE.get_or_init(|| {
        Regex::new(r"<[^>]*>")
            .unwrap_or_else(|error| panic!("markup regex failed to compile: {error}"))
    })
}

/// Trim input, remove markup tags and stray angle brackets.
///
/// Returns `None` when nothing but whitespace remains.
///
/// # Examples
/// ```
/// use institute::domain::sanitize_text;
///
/// assert_eq!(sanitize_text("  <b>Ada</b> "), Some("Ada".to_owned()));
/// assert_eq!(sanitize_text("<script></script>"), None);
/// ```
pub fn sanitize_text(raw: &str) -> Option<String> {
    let stripped = tag_regex().replace_all(raw, "");
    let cleaned: String = stripped.chars().filter(|c| *c != '<' && *c != '>').collect();
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Apply [`sanitize_text`] to an optional field.
pub fn sanitize_optional(raw: Option<&str>) -> Option<String> {
    raw.and_then(sanitize_text)
}
