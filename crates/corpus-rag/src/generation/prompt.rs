//! Prompt templates for retrieve-and-query

use crate::retrieval::ScoredEntry;
use crate::types::{OutputMode, Query};

/// Fixed instruction sent in structured mode instead of the caller's query
pub const CHARACTER_EXTRACTION_INSTRUCTION: &str = r#"Extract all characters from the text. For each character, provide their name, a brief description, and key personality traits.
Respond with ONLY a JSON array of objects and no other text. Each object must have exactly these properties:
- "id": a unique integer for each character
- "name": the character's name (string)
- "description": a brief description of the character (string)
- "personality": key personality traits of the character (string)

If the text contains no characters, respond with [].

Example format:
[
  {
    "id": 1,
    "name": "Character Name",
    "description": "Brief description",
    "personality": "Key personality traits"
  }
]"#;

/// Prompt builder for grounded completions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Compose the completion prompt for a query and its retrieved fragments
    pub fn compose(query: &Query, hits: &[ScoredEntry<'_>]) -> String {
        let context = Self::build_context(hits);
        match query.mode {
            OutputMode::FreeForm => Self::build_qa_prompt(&query.text, &context),
            OutputMode::Structured => Self::build_extraction_prompt(&context),
        }
    }

    /// The text that is actually asked of the model in a given mode. This is
    /// also the text embedded for retrieval when no query embedding is given.
    pub fn question_text(query: &Query) -> &str {
        match query.mode {
            OutputMode::FreeForm => &query.text,
            OutputMode::Structured => CHARACTER_EXTRACTION_INSTRUCTION,
        }
    }

    /// Concatenate fragment texts in ranked order
    pub fn build_context(hits: &[ScoredEntry<'_>]) -> String {
        hits.iter()
            .map(|hit| hit.entry.text.trim())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build a grounded question-answering prompt
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Context information is below.
---------------------
{context}
---------------------
Given the context information and not prior knowledge, answer the query.
Query: {question}
Answer:"#,
            context = context,
            question = question
        )
    }

    /// Build the character extraction prompt over the retrieved context
    pub fn build_extraction_prompt(context: &str) -> String {
        format!(
            r#"Context information is below.
---------------------
{context}
---------------------
Using only the context information above, follow these instructions.
{instruction}
Answer:"#,
            context = context,
            instruction = CHARACTER_EXTRACTION_INSTRUCTION
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CorpusEntry, SamplingParams};

    fn query(text: &str, mode: OutputMode) -> Query {
        Query {
            text: text.to_string(),
            top_k: 2,
            sampling: SamplingParams::new(0.1, 1.0).unwrap(),
            mode,
            embedding: None,
        }
    }

    #[test]
    fn test_free_form_prompt_contains_fragment_and_query() {
        let entry = CorpusEntry::new(0, "Alice loves tea.", vec![1.0, 0.0]);
        let hits = vec![ScoredEntry { entry: &entry, score: 1.0 }];
        let prompt = PromptBuilder::compose(&query("What does Alice love?", OutputMode::FreeForm), &hits);

        assert!(prompt.contains("Alice loves tea."));
        assert!(prompt.contains("What does Alice love?"));
        assert!(prompt.find("Alice loves tea.") < prompt.find("What does Alice love?"));
    }

    #[test]
    fn test_context_keeps_ranked_order() {
        let first = CorpusEntry::new(3, "first", vec![1.0]);
        let second = CorpusEntry::new(1, "second", vec![1.0]);
        let hits = vec![
            ScoredEntry { entry: &first, score: 0.9 },
            ScoredEntry { entry: &second, score: 0.4 },
        ];
        assert_eq!(PromptBuilder::build_context(&hits), "first\n\nsecond");
    }

    #[test]
    fn test_structured_prompt_ignores_query_text() {
        let entry = CorpusEntry::new(0, "Alice loves tea.", vec![1.0, 0.0]);
        let hits = vec![ScoredEntry { entry: &entry, score: 1.0 }];
        let q = query("ignore me entirely", OutputMode::Structured);
        let prompt = PromptBuilder::compose(&q, &hits);

        assert!(!prompt.contains("ignore me entirely"));
        assert!(prompt.contains("Alice loves tea."));
        for field in ["\"id\"", "\"name\"", "\"description\"", "\"personality\""] {
            assert!(prompt.contains(field), "missing {}", field);
        }
        assert_eq!(PromptBuilder::question_text(&q), CHARACTER_EXTRACTION_INSTRUCTION);
    }

    #[test]
    fn test_empty_context_still_builds_prompt() {
        let prompt = PromptBuilder::compose(&query("anything?", OutputMode::FreeForm), &[]);
        assert!(prompt.contains("Query: anything?"));
    }
}
