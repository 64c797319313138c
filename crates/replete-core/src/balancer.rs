//! Poor-man's bracket pairing.
//!
//! Covers the trivial cases a user can type before the engine's structural
//! formatter has finished loading: a lone opening bracket gets its partner.

/// Returns the closing partner of an opening bracket.
fn closing_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

/// Pairs a lone opening bracket typed at the start of an empty input.
///
/// Only fires when `text` is exactly `(`, `[` or `{` and the cursor sits
/// right after it. The cursor is kept at offset 1, between the pair.
/// Every other input comes back unchanged.
pub fn apply(text: &str, cursor: usize) -> (String, usize) {
    let mut chars = text.chars();
    if cursor == 1
        && let (Some(open), None) = (chars.next(), chars.next())
        && let Some(close) = closing_for(open)
    {
        return (format!("{open}{close}"), cursor);
    }
    (text.to_string(), cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_each_bracket() {
        assert_eq!(apply("(", 1), ("()".to_string(), 1));
        assert_eq!(apply("[", 1), ("[]".to_string(), 1));
        assert_eq!(apply("{", 1), ("{}".to_string(), 1));
    }

    #[test]
    fn test_wrong_cursor_is_identity() {
        assert_eq!(apply("(", 0), ("(".to_string(), 0));
        assert_eq!(apply("(", 2), ("(".to_string(), 2));
    }

    #[test]
    fn test_other_text_is_identity() {
        for (text, cursor) in [
            ("", 0),
            ("", 1),
            ("a", 1),
            (")", 1),
            ("((", 1),
            ("()", 1),
            ("(+", 1),
            ("λ", 1),
            ("<", 1),
        ] {
            assert_eq!(apply(text, cursor), (text.to_string(), cursor));
        }
    }
}
