//! OpenAI-compatible chat-completions client.
//!
//! # Responsibilities
//! - Send a fixed prompt template per task
//! - Request JSON output and parse it into the task's response schema
//! - Map HTTP and decoding failures to [`ProviderError`]

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::observability::metrics;
use crate::providers::seo::SeoVariant;
use crate::providers::social::GeneratedPost;
use crate::providers::{ProviderError, ProviderResult};
use crate::store::{Network, Product};

const SEO_SYSTEM_PROMPT: &str = "You are an SEO copywriter for an online marketplace of teaching resources. \
Write listing titles under 80 characters and descriptions between 150 and 500 characters. \
Answer with JSON only: {\"variants\":[{\"title\":string,\"description\":string,\"tags\":[string]}]}";

const SOCIAL_SYSTEM_PROMPT: &str = "You write social media posts that promote teaching resources. \
Respect each network's length limit and tone. Hashtags are single words without '#'. \
Answer with JSON only: {\"posts\":[{\"network\":string,\"title\":string,\"content\":string,\"hashtags\":[string]}]}";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VariantsEnvelope {
    variants: Vec<SeoVariant>,
}

#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    posts: Vec<GeneratedPost>,
}

/// Chat-completions client bound to one key and model.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout,
        }
    }

    /// Ask for three title/description variants.
    pub async fn seo_variants(&self, product: &Product) -> ProviderResult<Vec<SeoVariant>> {
        let prompt = format!(
            "Write 3 improved listing variants.\nTitle: {}\nDescription: {}\nTags: {}",
            product.title,
            product.description,
            product.tags.join(", ")
        );
        let envelope: VariantsEnvelope = self.complete_json(SEO_SYSTEM_PROMPT, prompt).await?;
        if envelope.variants.is_empty() {
            return Err(ProviderError::Decode("model returned no variants".into()));
        }
        Ok(envelope.variants)
    }

    /// Ask for one post per network. Posts for networks that were not
    /// requested are dropped.
    pub async fn social_posts(&self, product: &Product, networks: &[Network]) -> ProviderResult<Vec<GeneratedPost>> {
        let names: Vec<&str> = networks.iter().map(Network::label).collect();
        let prompt = format!(
            "Write one post for each of: {}.\nProduct: {}\nDescription: {}\nTags: {}\nListing: {}",
            names.join(", "),
            product.title,
            product.description,
            product.tags.join(", "),
            product.source_url.as_deref().unwrap_or("")
        );
        let envelope: PostsEnvelope = self.complete_json(SOCIAL_SYSTEM_PROMPT, prompt).await?;
        let posts: Vec<GeneratedPost> = envelope
            .posts
            .into_iter()
            .filter(|p| networks.contains(&p.network))
            .map(GeneratedPost::sanitized)
            .collect();
        if posts.is_empty() {
            return Err(ProviderError::Decode("model returned no usable posts".into()));
        }
        Ok(posts)
    }

    async fn complete_json<T: DeserializeOwned>(&self, system: &str, user: String) -> ProviderResult<T> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.7,
        });

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                metrics::record_provider_call("llm", "error");
                ProviderError::from(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            metrics::record_provider_call("llm", "error");
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "LLM request failed");
            return Err(ProviderError::Status {
                provider: "llm",
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = resp.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Decode("response had no message content".into()))?;

        metrics::record_provider_call("llm", "live");
        serde_json::from_str(strip_code_fence(&content))
            .map_err(|e| ProviderError::Decode(format!("model output is not the expected JSON: {}", e)))
    }
}

/// Models sometimes wrap JSON in a ```json fence despite the response format.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}
