//! LLM prompt for structured text analysis

use gleaner_llm::Prompt;

/// System message sent with every analysis request
pub const SYSTEM_PROMPT: &str =
    "You are a helpful text analysis assistant. Always respond with valid JSON only.";

/// Builds prompts for the LLM to analyze one text
pub struct PromptBuilder<'a> {
    text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Build the complete analysis prompt
    pub fn build(&self) -> Prompt {
        let mut user = String::with_capacity(ANALYSIS_INSTRUCTIONS.len() + self.text.len() + 32);

        user.push_str(ANALYSIS_INSTRUCTIONS);
        user.push_str("\n\nText to analyze:\n");
        user.push_str(self.text);

        Prompt::new(SYSTEM_PROMPT, user)
    }
}

const ANALYSIS_INSTRUCTIONS: &str = r#"You are an expert text analyst. Analyze the provided text and return your analysis as valid JSON with exactly this structure:

{
    "summary": "A concise 1-2 sentence summary capturing the main point",
    "title": "A descriptive title for the text (or null if no clear title can be determined)",
    "topics": ["topic1", "topic2", "topic3"],
    "sentiment": "positive|neutral|negative",
    "keywords": ["keyword1", "keyword2", "keyword3"]
}

Requirements:
- summary: Must be 1-2 sentences maximum, capturing the core message
- title: Extract existing title or create a descriptive one; use null if text is too fragmented
- topics: Identify exactly 3 key themes, subjects, or topics discussed
- sentiment: Classify overall emotional tone as "positive", "neutral", or "negative"
- keywords: Extract exactly 3 most important/frequent nouns or key terms from the text

Return ONLY the JSON object with no additional text, explanations, or markdown formatting."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_text_last() {
        let prompt = PromptBuilder::new("Alice opened a bakery in Lisbon.").build();
        assert!(prompt.user.ends_with("Text to analyze:\nAlice opened a bakery in Lisbon."));
    }

    #[test]
    fn test_prompt_requests_every_field() {
        let prompt = PromptBuilder::new("x").build();
        for field in ["\"summary\"", "\"title\"", "\"topics\"", "\"sentiment\"", "\"keywords\""] {
            assert!(prompt.user.contains(field), "missing {}", field);
        }
        assert!(prompt.user.contains("positive|neutral|negative"));
    }

    #[test]
    fn test_system_prompt() {
        let prompt = PromptBuilder::new("x").build();
        assert_eq!(prompt.system, SYSTEM_PROMPT);
    }
}
