//! Discord message size utilities
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Truncate text to fit the message limit, adding ellipsis if needed
pub fn truncate_for_message(text: &str) -> String {
    if text.len() <= MESSAGE_LIMIT {
        text.to_string()
    } else {
        // Find a safe UTF-8 boundary
        let mut end = MESSAGE_LIMIT - 3; // Room for "..."
        while !text.is_char_boundary(end) && end > 0 {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_for_message("hello"), "hello");
    }

    #[test]
    fn test_long_text_truncated() {
        let long = "x".repeat(MESSAGE_LIMIT + 50);
        let result = truncate_for_message(&long);
        assert_eq!(result.len(), MESSAGE_LIMIT);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_utf8_boundaries() {
        let long = "é".repeat(MESSAGE_LIMIT);
        let result = truncate_for_message(&long);
        assert!(result.len() <= MESSAGE_LIMIT);
        assert!(result.ends_with("..."));
    }
}
