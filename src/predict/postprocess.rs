/// Role marker the chat template echoes into the decoded text.
pub const ASSISTANT_MARKER: &str = "assistant";

/// Separates echoed role markers from the reply.
///
/// Every literal occurrence of `"assistant"` ends up preceded by two newlines:
/// newlines already in front of it count towards the two. The result is then
/// trimmed. This is a plain substring match, so a reply that itself contains
/// the word "assistant" is rewritten too. Callers depend on the exact layout.
pub fn separate_roles(decoded: &str) -> String {
    let mut out = String::with_capacity(decoded.len() + 16);
    let mut last = 0;

    for (start, marker) in decoded.match_indices(ASSISTANT_MARKER) {
        out.push_str(&decoded[last..start]);
        let newlines = out.chars().rev().take(2).take_while(|c| *c == '\n').count();
        for _ in newlines..2 {
            out.push('\n');
        }
        out.push_str(marker);
        last = start + marker.len();
    }
    out.push_str(&decoded[last..]);

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserts_two_newlines_before_each_marker() {
        assert_eq!(
            separate_roles("Xassistant Y assistant Z"),
            "X\n\nassistant Y \n\nassistant Z"
        );
    }

    #[test]
    fn test_existing_newline_counts_towards_separator() {
        assert_eq!(
            separate_roles("user: describe\nassistant: Normal chest X-ray."),
            "user: describe\n\nassistant: Normal chest X-ray."
        );
        assert_eq!(separate_roles("a\n\nassistant b"), "a\n\nassistant b");
    }

    #[test]
    fn test_without_marker_only_trims() {
        assert_eq!(separate_roles("  No acute findings.\n"), "No acute findings.");
        assert_eq!(separate_roles("No acute findings."), "No acute findings.");
        assert_eq!(separate_roles(""), "");
    }

    #[test]
    fn test_leading_marker_is_trimmed() {
        assert_eq!(separate_roles("assistant: ok"), "assistant: ok");
    }

    #[test]
    fn test_rewrites_word_inside_reply() {
        assert_eq!(
            separate_roles("ask your assistant"),
            "ask your \n\nassistant"
        );
    }

    #[test]
    fn test_adjacent_markers() {
        assert_eq!(separate_roles("aassistantassistant"), "a\n\nassistant\n\nassistant");
    }

    #[test]
    fn test_stable_when_applied_twice() {
        let once = separate_roles("user: hi assistant: there");
        assert_eq!(separate_roles(&once), once);
    }
}
