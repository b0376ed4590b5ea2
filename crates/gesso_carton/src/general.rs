//! General string helpers.

/// Check if a string is empty or contains only ASCII whitespace
#[inline]
pub fn is_blank(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_whitespace())
}

/// Split a class attribute value into its class names
pub fn split_class_list(value: &str) -> impl Iterator<Item = &str> {
    value.split_ascii_whitespace()
}
