//! Prompt templates for news question answering

use crate::types::SearchHit;

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the numbered source blocks
    pub fn build_context(hits: &[SearchHit]) -> String {
        let mut context = String::new();
        for (i, hit) in hits.iter().enumerate() {
            context.push_str(&format!("\n[Source {}] {}\n{}\n", i + 1, hit.title, hit.text));
        }
        context
    }

    /// Build the full prompt, switching to the no-context variant on empty hits
    pub fn build(question: &str, hits: &[SearchHit]) -> String {
        if hits.is_empty() {
            return Self::build_no_context_prompt(question);
        }
        Self::build_rag_prompt(question, &Self::build_context(hits))
    }

    /// Prompt asking the model to say plainly that nothing was found
    pub fn build_no_context_prompt(question: &str) -> String {
        format!(
            "Question: {question}\n\n\
             No relevant context found in the knowledge base. \
             Please respond that you don't have information about this topic."
        )
    }

    /// Grounded prompt over the given context
    pub fn build_rag_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are a helpful assistant that answers questions about cryptocurrency news based on provided context.

Context from recent crypto news articles:
{context}

Question: {question}

Instructions:
- Answer the question using ONLY the information from the provided context
- If the context doesn't contain enough information, say so clearly
- Be concise and factual
- Don't make up information not present in the context
- Cite specific articles when relevant

Answer:"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, text: &str) -> SearchHit {
        SearchHit {
            text: text.to_string(),
            source: format!("https://news.example/{}", title.to_lowercase()),
            title: title.to_string(),
            score: 0.8,
            timestamp: String::new(),
        }
    }

    #[test]
    fn test_sources_numbered_in_hit_order() {
        let prompt = PromptBuilder::build(
            "What moved the market?",
            &[hit("Bitcoin", "BTC rose 5%."), hit("Ether", "ETH fell 2%.")],
        );
        let first = prompt.find("[Source 1] Bitcoin\nBTC rose 5%.").unwrap();
        let second = prompt.find("[Source 2] Ether\nETH fell 2%.").unwrap();
        assert!(first < second);
        assert!(prompt.contains("Question: What moved the market?"));
        assert!(prompt.contains("ONLY the information from the provided context"));
        assert!(prompt.trim_end().ends_with("Answer:"));
    }

    #[test]
    fn test_empty_hits_use_no_context_prompt() {
        let prompt = PromptBuilder::build("Who won the match?", &[]);
        assert!(prompt.starts_with("Question: Who won the match?"));
        assert!(prompt.contains("No relevant context found"));
        assert!(!prompt.contains("[Source"));
    }
}
