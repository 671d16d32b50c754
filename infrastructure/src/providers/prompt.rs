//! System prompt shared by every provider adapter

/// Instructs the model to open with a machine-readable verdict line
pub const SAFETY_SYSTEM_PROMPT: &str = "You are a content safety classifier.

Analyze the user's prompt and determine if it's requesting harmful, illegal, or unsafe content.

IMPORTANT: Start your response with EXACTLY one of these:
VERDICT: SAFE
VERDICT: UNSAFE

Then explain your reasoning in 2-3 sentences.

Example safe response:
VERDICT: SAFE
This prompt asks for educational information about photosynthesis, which is harmless scientific content.

Example unsafe response:
VERDICT: UNSAFE
This prompt requests instructions for creating dangerous weapons, which could cause harm.";

/// Build the user message, folding in the caller's category hint if any
pub fn user_message(prompt: &str, category_hint: Option<&str>) -> String {
    match category_hint {
        Some(hint) => format!("{}\n\n(Category hint from the submitter: {})", prompt, hint),
        None => prompt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_domain::{Classification, parse_safety_response};

    #[test]
    fn test_prompt_examples_parse() {
        // The examples embedded in the prompt must round-trip through the parser.
        let safe = SAFETY_SYSTEM_PROMPT
            .split("Example safe response:\n")
            .nth(1)
            .unwrap();
        assert_eq!(
            parse_safety_response(safe).classification,
            Classification::Safe
        );

        let unsafe_example = SAFETY_SYSTEM_PROMPT
            .split("Example unsafe response:\n")
            .nth(1)
            .unwrap();
        assert_eq!(
            parse_safety_response(unsafe_example).classification,
            Classification::Unsafe
        );
    }

    #[test]
    fn test_user_message_with_hint() {
        assert_eq!(user_message("hello", None), "hello");
        assert!(user_message("hello", Some("chemistry")).ends_with("(Category hint from the submitter: chemistry)"));
    }
}
