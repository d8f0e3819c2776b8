//! Text helpers shared by the send and fetch paths.

/// Truncate `s` to at most `max` bytes without splitting a UTF-8 character.
///
/// Returns the original slice unchanged when it already fits.
#[must_use]
pub fn truncate_at_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
