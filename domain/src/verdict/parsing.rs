//! Safety response parsing.
//!
//! Every provider is asked to open its answer with `VERDICT: SAFE` or
//! `VERDICT: UNSAFE` followed by a short explanation. These functions turn
//! that free-form text into a [`Classification`]. They never fail: anything
//! that cannot be read as a verdict becomes [`Classification::Uncertain`].
//!
//! Only the first non-empty line is inspected, so a model that merely
//! mentions the word "unsafe" in its explanation is not misread.

use super::classification::Classification;

/// Maximum characters kept for rationale and concern text
pub const MAX_RATIONALE_CHARS: usize = 200;

/// Structured view of a provider's safety answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub classification: Classification,
    /// Explanation following the verdict line (truncated)
    pub rationale: String,
    /// Reasons given for an UNSAFE verdict
    pub concerns: Vec<String>,
}

/// Parse a complete provider answer.
///
/// # Examples
///
/// ```
/// use chorus_domain::verdict::parsing::parse_safety_response;
/// use chorus_domain::Classification;
///
/// let parsed = parse_safety_response("VERDICT: UNSAFE\nRequests weapon instructions.");
/// assert_eq!(parsed.classification, Classification::Unsafe);
/// assert_eq!(parsed.concerns, vec!["Requests weapon instructions.".to_string()]);
///
/// let vague = parse_safety_response("It depends on the context.");
/// assert_eq!(vague.classification, Classification::Uncertain);
/// ```
pub fn parse_safety_response(response: &str) -> ParsedResponse {
    let trimmed = response.trim();
    let mut lines = trimmed.lines();
    let first_line = lines.next().unwrap_or_default();
    let classification = extract_classification(first_line);

    let rest = lines
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let rationale = if classification == Classification::Uncertain {
        truncate_chars(trimmed, MAX_RATIONALE_CHARS)
    } else {
        truncate_chars(&rest, MAX_RATIONALE_CHARS)
    };

    let concerns = if classification == Classification::Unsafe && !rest.is_empty() {
        vec![truncate_chars(&rest, MAX_RATIONALE_CHARS)]
    } else {
        Vec::new()
    };

    ParsedResponse {
        classification,
        rationale,
        concerns,
    }
}

/// Read the classification from a single verdict line.
///
/// Tolerates markdown emphasis (`**VERDICT:** SAFE`), surrounding text and
/// arbitrary case. UNSAFE is checked before SAFE because it contains it.
pub fn extract_classification(line: &str) -> Classification {
    let normalized: String = line
        .chars()
        .filter(|c| !matches!(c, '*' | '#' | '_' | '`'))
        .collect::<String>()
        .to_uppercase();
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    let Some(pos) = normalized.find("VERDICT") else {
        return Classification::Uncertain;
    };
    let after = normalized[pos + "VERDICT".len()..]
        .trim_start_matches([':', ' ', '-', '='])
        .trim_start();

    if after.starts_with("UNSAFE") {
        Classification::Unsafe
    } else if after.starts_with("SAFE") {
        Classification::Safe
    } else {
        Classification::Uncertain
    }
}

/// Cut `text` to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_verdict() {
        let parsed = parse_safety_response(
            "VERDICT: SAFE\nThis prompt asks for educational information about photosynthesis.",
        );
        assert_eq!(parsed.classification, Classification::Safe);
        assert_eq!(
            parsed.rationale,
            "This prompt asks for educational information about photosynthesis."
        );
        assert!(parsed.concerns.is_empty());
    }

    #[test]
    fn test_unsafe_verdict_collects_concerns() {
        let parsed = parse_safety_response(
            "VERDICT: UNSAFE\nThis prompt requests instructions for weapons.\nIt could cause harm.",
        );
        assert_eq!(parsed.classification, Classification::Unsafe);
        assert_eq!(
            parsed.concerns,
            vec!["This prompt requests instructions for weapons. It could cause harm.".to_string()]
        );
    }

    #[test]
    fn test_only_first_line_counts() {
        let parsed =
            parse_safety_response("I think this is fine.\nVERDICT: UNSAFE would be too strict.");
        assert_eq!(parsed.classification, Classification::Uncertain);
    }

    #[test]
    fn test_markdown_and_case_tolerated() {
        assert_eq!(
            extract_classification("**Verdict:** Unsafe"),
            Classification::Unsafe
        );
        assert_eq!(extract_classification("## verdict: safe"), Classification::Safe);
        assert_eq!(extract_classification("VERDICT - SAFE."), Classification::Safe);
    }

    #[test]
    fn test_unsafe_not_misread_as_safe() {
        assert_eq!(
            extract_classification("VERDICT: UNSAFE"),
            Classification::Unsafe
        );
    }

    #[test]
    fn test_empty_response_is_uncertain() {
        let parsed = parse_safety_response("");
        assert_eq!(parsed.classification, Classification::Uncertain);
        assert!(parsed.rationale.is_empty());

        let parsed = parse_safety_response("   \n  ");
        assert_eq!(parsed.classification, Classification::Uncertain);
    }

    #[test]
    fn test_missing_label_is_uncertain() {
        assert_eq!(
            extract_classification("VERDICT: it depends"),
            Classification::Uncertain
        );
        assert_eq!(
            extract_classification("The content is safe."),
            Classification::Uncertain
        );
    }

    #[test]
    fn test_rationale_truncated() {
        let long = format!("VERDICT: SAFE\n{}", "a".repeat(500));
        let parsed = parse_safety_response(&long);
        assert_eq!(parsed.rationale.chars().count(), MAX_RATIONALE_CHARS);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
