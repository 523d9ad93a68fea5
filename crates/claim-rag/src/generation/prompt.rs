//! Prompt template for claim adjudication

use crate::retrieval::RetrievedContext;

/// Prompt builder for claim queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render retrieved chunks as numbered, source-labelled clauses
    pub fn build_context(context: &RetrievedContext) -> String {
        context
            .chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| format!("[{}] Source: {}\n{}", i + 1, chunk.source, chunk.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the adjudication prompt
    pub fn build_claim_prompt(context: &str, question: &str) -> String {
        format!(
            r#"
You are an expert insurance claim adjudicator. Your task is to evaluate a claim based ONLY on the provided policy clauses and return a structured JSON response.

**Policy Clauses (Context):**
{context}

**User Query:**
{question}

Based strictly on the context provided, determine the claim's status.
Your response MUST be a JSON object with three keys:
1. "decision": A string, either "Approved" or "Rejected".
2. "amount": An integer representing the approved amount. If rejected, this should be 0.
3. "justification": A string explaining the decision by referencing the specific policy clauses from the context.

JSON Response:
"#,
            context = context,
            question = question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::RetrievedChunk;

    fn context() -> RetrievedContext {
        RetrievedContext {
            chunks: vec![
                RetrievedChunk {
                    text: "Knee surgery is covered after a waiting period of 2 months.".to_string(),
                    source: "policy.pdf".to_string(),
                    chunk_index: 3,
                    distance: 0.2,
                },
                RetrievedChunk {
                    text: "Claims must be filed within 30 days.".to_string(),
                    source: "terms.docx".to_string(),
                    chunk_index: 0,
                    distance: 0.7,
                },
            ],
        }
    }

    #[test]
    fn test_context_numbered_in_retrieval_order() {
        let rendered = PromptBuilder::build_context(&context());
        assert_eq!(
            rendered,
            "[1] Source: policy.pdf\nKnee surgery is covered after a waiting period of 2 months.\n\n\
             [2] Source: terms.docx\nClaims must be filed within 30 days."
        );
    }

    #[test]
    fn test_prompt_contains_context_question_and_schema() {
        let ctx = PromptBuilder::build_context(&context());
        let prompt =
            PromptBuilder::build_claim_prompt(&ctx, "46M, knee surgery, Pune, 3-month policy");

        assert!(prompt.contains(&ctx));
        assert!(prompt.contains("46M, knee surgery, Pune, 3-month policy"));
        assert!(prompt.contains("ONLY on the provided policy clauses"));
        assert!(prompt.contains(r#""decision": A string, either "Approved" or "Rejected"."#));
        assert!(prompt.contains(r#""amount""#));
        assert!(prompt.contains(r#""justification""#));
        assert!(prompt.trim_end().ends_with("JSON Response:"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = PromptBuilder::build_claim_prompt("ctx", "q");
        let b = PromptBuilder::build_claim_prompt("ctx", "q");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_context_renders_empty_section() {
        let ctx = PromptBuilder::build_context(&RetrievedContext::default());
        assert!(ctx.is_empty());
        assert!(PromptBuilder::build_claim_prompt(&ctx, "q").contains("**Policy Clauses (Context):**\n\n"));
    }
}
