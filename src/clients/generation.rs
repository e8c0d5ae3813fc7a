//! Text generation client (hosted inference API)

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation API key is missing!")]
    MissingApiKey,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Generation API returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Sampling parameters sent with every prompt
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GenerationParams {
    pub max_length: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: 100,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 50,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParams,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: Option<String>,
}

#[derive(Clone)]
pub struct GenerationClient {
    url: String,
    api_key: Option<String>,
    params: GenerationParams,
    http_client: reqwest::Client,
}

impl GenerationClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>, http_client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            api_key,
            params: GenerationParams::default(),
            http_client,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a completion for `prompt`.
    ///
    /// `Ok(None)` means the API answered but carried no generated text.
    pub async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;

        let response = self.http_client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&GenerationRequest { inputs: prompt, parameters: self.params })
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response.json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        tracing::debug!("Generation API response: {}", body);
        Ok(extract_generated_text(body))
    }
}

/// `[{"generated_text": "..."}]` -> text of the first element
fn extract_generated_text(body: serde_json::Value) -> Option<String> {
    serde_json::from_value::<Vec<GeneratedText>>(body)
        .ok()?
        .into_iter()
        .next()?
        .generated_text
}
