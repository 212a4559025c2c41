//! Shared helpers for Diesel repository implementations.

/// Wrap `needle` for a substring `ILIKE`, escaping pattern metacharacters.
pub fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Cast a database count (`i64`) to a domain counter.
///
/// Counts are never negative; a negative value collapses to zero.
pub fn cast_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

/// Page offset as the `i64` Diesel's `OFFSET` expects.
pub fn cast_offset(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}
