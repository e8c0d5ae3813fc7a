//! Answer service - grounded question answering over stored threats

use crate::clients::GenerationClient;
use crate::services::context;
use crate::services::matcher::{MatchError, QueryMatcher};

pub const NO_RELEVANT_DATA: &str = "No relevant data found.";
pub const GENERATION_FALLBACK: &str = "Sorry, I couldn't process your request.";

#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("Generation API key is missing!")]
    MissingApiKey,
    #[error(transparent)]
    Match(#[from] MatchError),
}

#[derive(Clone)]
pub struct AnswerService {
    matcher: QueryMatcher,
    generator: GenerationClient,
}

impl AnswerService {
    pub fn new(matcher: QueryMatcher, generator: GenerationClient) -> Self {
        Self { matcher, generator }
    }

    /// Answer `query` from matched threats.
    ///
    /// Generation failures degrade to a fixed fallback answer; a missing
    /// generation key, a blank query and store failures are errors.
    pub async fn answer(&self, query: &str) -> Result<String, AnswerError> {
        if !self.generator.is_configured() {
            return Err(AnswerError::MissingApiKey);
        }

        let (_, threats) = self.matcher.find(query).await?;

        if threats.is_empty() {
            return Ok(NO_RELEVANT_DATA.to_string());
        }

        let prompt = build_prompt(&context::compose(&threats), query.trim());

        match self.generator.generate(&prompt).await {
            Ok(Some(text)) if !text.is_empty() => Ok(text),
            Ok(_) => {
                tracing::error!("Generation API response carried no generated text");
                Ok(GENERATION_FALLBACK.to_string())
            }
            Err(e) => {
                tracing::error!("Generation API call failed: {}", e);
                Ok(GENERATION_FALLBACK.to_string())
            }
        }
    }
}

/// Single prompt embedding the context and the user's question
pub fn build_prompt(context: &str, query: &str) -> String {
    format!("OUTPUT from the huggingface AI model.\n\n{context}\n\nUser Query: {query}")
}
