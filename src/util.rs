// src/util.rs — Shared utility functions

/// First `max_chars` characters of `s` (not bytes, so multibyte text is never split).
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Round to two decimals, the precision every reported metric uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
