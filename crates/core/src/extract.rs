//! Fallback extraction of a JSON payload from free-form model text.

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Pull a JSON-parsable substring out of raw model output.
///
/// Looks for the first json-tagged triple-backtick fence and returns its
/// interior with surrounding whitespace stripped. Without a complete fence
/// the input is returned unchanged and the caller attempts to parse it
/// as-is. First match wins; nested fences are not handled. Never fails -
/// parse errors are surfaced by the caller.
pub fn extract_structured(raw: &str) -> &str {
    let Some(open) = raw.find(FENCE_OPEN) else {
        return raw;
    };
    let interior = &raw[open + FENCE_OPEN.len()..];
    match interior.find(FENCE_CLOSE) {
        Some(close) => interior[..close].trim(),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::extract_structured;

    #[test]
    fn returns_fence_interior_exactly() {
        let raw = "Here is the plan:\n```json\n{\"title\": \"Build\"}\n```\nLet me know!";
        assert_eq!(extract_structured(raw), "{\"title\": \"Build\"}");
    }

    #[test]
    fn first_fence_wins() {
        let raw = "```json\n{\"a\": 1}\n```\ntext\n```json\n{\"b\": 2}\n```";
        assert_eq!(extract_structured(raw), "{\"a\": 1}");
    }

    #[test]
    fn text_without_fence_passes_through_unchanged() {
        let raw = "{\"action\": \"reply_to_user\", \"text\": \"hi\"}";
        assert_eq!(extract_structured(raw), raw);
    }

    #[test]
    fn unterminated_fence_passes_through_unchanged() {
        let raw = "```json\n{\"title\": \"Build\"}";
        assert_eq!(extract_structured(raw), raw);
    }

    #[test]
    fn untagged_fence_is_not_treated_as_json() {
        let raw = "```\n{\"title\": \"Build\"}\n```";
        assert_eq!(extract_structured(raw), raw);
    }

    #[test]
    fn empty_input_passes_through() {
        assert_eq!(extract_structured(""), "");
    }
}
