//! Shared text tokenization for FTS pattern matching (spec §4.2).
//!
//! Used by both the FTS manager and the per-dialect match-predicate builders
//! in `backend::sqlite`/`backend::client_server`, so it lives outside both to
//! avoid a module cycle.

/// Split `pattern` into lowercase tokens: letters, digits, and non-ASCII
/// characters are kept; runs of anything else collapse into a boundary.
/// Matches spec §4.2's PostgreSQL-dialect description, generalized to all
/// three dialects for consistent tokenization ahead of prefix-matching.
#[must_use]
pub fn tokenize(pattern: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in pattern.chars() {
        if ch.is_alphanumeric() || !ch.is_ascii() {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_non_alphanumeric_runs() {
        assert_eq!(tokenize("foo-bar_baz.txt"), vec!["foo", "bar", "baz", "txt"]);
    }

    #[test]
    fn empty_pattern_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn lowercases_and_keeps_non_ascii() {
        assert_eq!(tokenize("Bücher"), vec!["bücher"]);
    }
}
