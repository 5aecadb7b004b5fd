use crate::config::Settings;
use crate::history::Turn;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Classified result of one generation round trip.
///
/// Failures are tagged variants rather than errors; nothing below the REPL
/// boundary aborts the session.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// Non-empty generated text
    Text(String),
    /// The provider refused to generate content, with its stated reason
    Blocked(String),
    /// Syntactically successful call with no generated text
    Empty,
    /// Network, credential, or provider failure
    TransportError(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Render the transcript plus the new message as one flat text prompt:
/// each turn as "<Role>: <content>" on its own line, then the new user
/// message and a trailing "Assistant:" cue for the model to complete.
fn build_prompt(history: &[Turn], new_user_text: &str) -> String {
    let mut prompt = String::new();
    for turn in history {
        prompt.push_str(&format!("{}: {}\n", turn.role, turn.content));
    }
    prompt.push_str(&format!("User: {}\nAssistant:", new_user_text));
    prompt
}

pub struct LlmClient {
    client: Client,
    api_key: String,
    settings: Settings,
}

impl LlmClient {
    pub fn new(api_key: String, settings: Settings) -> Self {
        Self {
            client: Client::new(),
            api_key,
            settings,
        }
    }

    pub fn model(&self) -> &str {
        &self.settings.llm.model
    }

    /// Send the flattened transcript to the generateContent endpoint and
    /// classify the response. Transient transport failures are retried
    /// with backoff before collapsing into `TransportError`.
    pub async fn generate(&self, history: &[Turn], new_user_text: &str) -> GenerateOutcome {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(history, new_user_text),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.llm.temperature,
                max_output_tokens: self.settings.llm.max_output_tokens,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.llm.endpoint, self.settings.llm.model
        );

        const MAX_RETRIES: u32 = 3;
        const BASE_DELAY_MS: u64 = 1000;

        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_DELAY_MS * 2_u64.pow(attempt - 1);
                tracing::warn!(
                    "[LlmClient] Retrying API call (attempt {}/{}) after {}ms delay",
                    attempt + 1,
                    MAX_RETRIES,
                    delay
                );
                tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
            }

            let response_result = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await;

            let response = match response_result {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!("[LlmClient] HTTP request failed: {}", e);
                    last_error = Some(format!("HTTP request failed: {}", e));
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                tracing::warn!(
                    "[LlmClient] API returned error status {}: {}",
                    status,
                    error_text
                );
                last_error = Some(format!("API error {}: {}", status, error_text));
                continue;
            }

            let body = match response.json::<GenerateResponse>().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("[LlmClient] Failed to decode response body: {}", e);
                    last_error = Some(format!("Response decode error: {}", e));
                    continue;
                }
            };

            return classify(body);
        }

        GenerateOutcome::TransportError(
            last_error.unwrap_or_else(|| "All retry attempts failed".to_string()),
        )
    }
}

fn classify(body: GenerateResponse) -> GenerateOutcome {
    if let Some(feedback) = &body.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return GenerateOutcome::Blocked(reason.clone());
        }
    }

    let candidate = match body.candidates.first() {
        Some(candidate) => candidate,
        None => return GenerateOutcome::Empty,
    };

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return GenerateOutcome::Blocked("SAFETY".to_string());
    }

    let text: String = candidate
        .content
        .as_ref()
        .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
        .unwrap_or_default();

    if text.is_empty() {
        GenerateOutcome::Empty
    } else {
        GenerateOutcome::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Role;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_settings(endpoint: &str) -> Settings {
        use crate::config::settings::*;
        Settings {
            llm: LlmConfig {
                model: "test-model".to_string(),
                endpoint: endpoint.to_string(),
                temperature: 0.7,
                max_output_tokens: 256,
            },
            history: HistoryConfig {
                file: "history.json".to_string(),
                max_turns: 50,
            },
            wiki: WikiConfig {
                endpoint: "https://en.wikipedia.org".to_string(),
                timeout_secs: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    #[test]
    fn test_build_prompt_flattens_history() {
        let history = vec![
            Turn::new(Role::User, "Hello"),
            Turn::new(Role::Assistant, "Hi! How can I help?"),
        ];

        let prompt = build_prompt(&history, "What is Rust?");

        assert_eq!(
            prompt,
            "User: Hello\nAssistant: Hi! How can I help?\nUser: What is Rust?\nAssistant:"
        );
    }

    #[test]
    fn test_build_prompt_without_history() {
        let prompt = build_prompt(&[], "Hi");
        assert_eq!(prompt, "User: Hi\nAssistant:");
    }

    #[tokio::test]
    async fn test_generate_returns_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .and(body_string_contains("User: ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "pong"}]},
                    "finishReason": "STOP"
                }]
            })))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new("key".to_string(), test_settings(&mock_server.uri()));
        let outcome = client.generate(&[], "ping").await;

        assert_eq!(outcome, GenerateOutcome::Text("pong".to_string()));
    }

    #[tokio::test]
    async fn test_generate_classifies_blocked_prompt() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new("key".to_string(), test_settings(&mock_server.uri()));
        let outcome = client.generate(&[], "something spicy").await;

        assert_eq!(outcome, GenerateOutcome::Blocked("SAFETY".to_string()));
    }

    #[tokio::test]
    async fn test_generate_classifies_empty_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": []},
                    "finishReason": "STOP"
                }]
            })))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new("key".to_string(), test_settings(&mock_server.uri()));
        let outcome = client.generate(&[], "hello?").await;

        assert_eq!(outcome, GenerateOutcome::Empty);
    }

    #[tokio::test]
    async fn test_generate_collapses_provider_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new("key".to_string(), test_settings(&mock_server.uri()));
        let outcome = client.generate(&[], "hello").await;

        match outcome {
            GenerateOutcome::TransportError(message) => {
                assert!(message.contains("500"));
            }
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
