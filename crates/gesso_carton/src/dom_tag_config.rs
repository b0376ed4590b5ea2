//! HTML element tables.

use phf::phf_set;

/// Elements that never have content or an end tag.
static VOID_TAGS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "menuitem", "meta", "param", "source", "track", "wbr",
};

/// Check if a tag is a void element (`<br>`, `<img>`, ...)
#[inline]
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_tags() {
        assert!(is_void_tag("input"));
        assert!(is_void_tag("wbr"));
        assert!(!is_void_tag("div"));
        assert!(!is_void_tag("INPUT"));
    }
}
