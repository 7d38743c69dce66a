//! Lexical validation of project identifiers
//!
//! Identifiers end up embedded in generated source across native toolchains,
//! so every dot-separated segment must be a plain identifier and must not be
//! a reserved keyword in any of them.

/// Keywords rejected as identifier segments
const RESERVED_WORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
];

/// Check a full, dot-separated identifier such as `com.example.app`
pub fn is_valid(id: &str) -> bool {
    !id.is_empty() && id.split('.').all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    let leading_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    leading_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_identifiers() {
        assert!(is_valid("com.example.app"));
        assert!(is_valid("hello"));
        assert!(is_valid("_private.thing"));
        assert!(is_valid("$root.v2"));
    }

    #[test]
    fn test_rejects_reserved_word_at_start() {
        assert!(!is_valid("int.bob"));
    }

    #[test]
    fn test_rejects_reserved_word_at_end() {
        assert!(!is_valid("bob.class"));
    }

    #[test]
    fn test_rejects_digit_leading_segment() {
        assert!(!is_valid("9lives"));
        assert!(!is_valid("com.9lives"));
    }

    #[test]
    fn test_rejects_empty_and_malformed() {
        assert!(!is_valid(""));
        assert!(!is_valid("a..b"));
        assert!(!is_valid("a.b-c"));
        assert!(!is_valid("with space"));
    }

    #[test]
    fn test_reserved_word_must_match_whole_segment() {
        // "interface" as a substring of a longer segment is fine
        assert!(is_valid("interfaces.app"));
        assert!(is_valid("printer.test"));
    }
}
