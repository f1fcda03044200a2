use once_cell::sync::Lazy;
use regex::Regex;

/// Default character budget for text handed to the model
pub const DEFAULT_TEXT_LIMIT: usize = 3000;

// Pre-compiled regex for whitespace normalization (compile once, use many times)
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});

/// Collapse whitespace runs to a single space, trim, and keep at most
/// `limit` characters (not bytes).
pub fn normalize_text(text: &str, limit: usize) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    let trimmed = collapsed.trim();
    match trimmed.char_indices().nth(limit) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

/// Collapse whitespace without truncating
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_and_trims() {
        let input = "  Hello   World\n\n\tTest  ";
        assert_eq!(normalize_text(input, DEFAULT_TEXT_LIMIT), "Hello World Test");
    }

    #[test]
    fn test_truncates_to_limit() {
        assert_eq!(normalize_text("abcdef", 3), "abc");
        assert_eq!(normalize_text("abc", 3), "abc");
        assert_eq!(normalize_text("abc", 0), "");
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        // Each rupee sign is 3 bytes
        assert_eq!(normalize_text("₹₹₹₹", 2), "₹₹");
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(normalize_text(" \n\t ", 10), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace(" ABC \n Cement "), "ABC Cement");
    }
}
