//! Chat-completions client for narrative generation.
//!
//! The collaborator contract: given canonical host records and a summary
//! preset, return a narrative, key insights, and a risk assessment. This is
//! implemented as three sequential calls against an OpenAI-compatible
//! chat-completions endpoint (narrative, then insight extraction, then risk
//! assessment).

use crate::ai::prompts;
use crate::models::{HostRecord, NarrativeSummary, SummaryType};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Token budget for the insight-extraction call.
const INSIGHTS_MAX_TOKENS: u32 = 300;
/// Token budget for the risk-assessment call.
const RISK_MAX_TOKENS: u32 = 200;
/// Temperature for the insight and risk extraction calls.
const EXTRACTION_TEMPERATURE: f32 = 0.2;

/// Configuration for the narrative client.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_url: String,
    pub api_key: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: String::new(),
            model_name: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.3,
            timeout_seconds: 120,
        }
    }
}

/// Message in a chat-completions request.
#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions API request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// Chat-completions API response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// The narrative-generation client.
pub struct NarrativeClient {
    config: AiConfig,
    http_client: reqwest::Client,
}

impl NarrativeClient {
    /// Create a new client with the configured request timeout.
    pub fn new(config: AiConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    /// Generate the full narrative for a batch of canonical records.
    pub async fn summarize_hosts(
        &self,
        hosts: &[HostRecord],
        summary_type: SummaryType,
    ) -> Result<NarrativeSummary> {
        info!(
            "Generating {} summary for {} hosts",
            summary_type,
            hosts.len()
        );

        let prompt = prompts::summarization_prompt(hosts, summary_type);
        let summary = self
            .chat(
                Some(&prompts::system_prompt(summary_type)),
                &prompt,
                prompts::narrative_max_tokens(summary_type),
                self.config.temperature,
            )
            .await?;

        let insights_text = self
            .chat(
                None,
                &prompts::insights_prompt(&summary, summary_type),
                INSIGHTS_MAX_TOKENS,
                EXTRACTION_TEMPERATURE,
            )
            .await?;
        let key_insights = parse_insights(
            &insights_text,
            prompts::insight_count(summary_type),
            summary_type,
        );

        let risk_assessment = self
            .chat(
                None,
                &prompts::risk_prompt(&summary, summary_type),
                RISK_MAX_TOKENS,
                EXTRACTION_TEMPERATURE,
            )
            .await?
            .trim()
            .to_string();

        info!("Successfully generated {} summary", summary_type);

        Ok(NarrativeSummary {
            summary,
            key_insights,
            risk_assessment,
            host_count: hosts.len(),
        })
    }

    /// Send one chat request and return the first choice's content.
    async fn chat(
        &self,
        system: Option<&str>,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_url.trim_end_matches('/')
        );

        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let request = ChatRequest {
            model: self.config.model_name.clone(),
            messages,
            max_tokens,
            temperature,
        };

        debug!("Sending chat request to {}", url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("Request timed out after {}s", self.config.timeout_seconds)
                } else if e.is_connect() {
                    anyhow::anyhow!("Cannot connect to API at {}", self.config.api_url)
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Chat API error {}: {}", status, body));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat response")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow::anyhow!("Chat response contained no choices"))
    }
}

/// Parse bullet-point insights out of an LLM response.
///
/// Keeps lines carrying a bullet marker, strips the markers, and truncates
/// to `limit`. Falls back to a stock line when nothing parses, so callers
/// never see an empty insight list.
fn parse_insights(text: &str, limit: usize, summary_type: SummaryType) -> Vec<String> {
    let insights: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.contains(['-', '•', '*']))
        .map(|line| {
            line.trim_start_matches(['•', '-', '*', ' '])
                .trim_end_matches('*')
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .take(limit)
        .collect();

    if insights.is_empty() {
        let label = match summary_type {
            SummaryType::Brief => "Brief",
            SummaryType::Technical => "Technical",
            SummaryType::Detailed => "Detailed",
        };
        vec![format!(
            "{} analysis completed - see summary for details",
            label
        )]
    } else {
        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_default() {
        let config = AiConfig::default();
        assert_eq!(config.model_name, "llama-3.3-70b-versatile");
        assert_eq!(config.temperature, 0.3);
        assert!(config.api_url.starts_with("https://"));
    }

    #[test]
    fn test_parse_insights_strips_markers() {
        let text = "Here are the findings:\n\
                    - First insight\n\
                    • Second insight\n\
                    * Third insight\n\
                    **- Fourth insight**\n";

        let insights = parse_insights(text, 5, SummaryType::Detailed);

        assert_eq!(
            insights,
            vec![
                "First insight",
                "Second insight",
                "Third insight",
                "Fourth insight"
            ]
        );
    }

    #[test]
    fn test_parse_insights_truncates_to_limit() {
        let text = "- one\n- two\n- three\n- four";
        let insights = parse_insights(text, 3, SummaryType::Brief);
        assert_eq!(insights.len(), 3);
    }

    #[test]
    fn test_parse_insights_ignores_prose_lines() {
        let text = "Summary of findings\n- real insight\nClosing remarks";
        let insights = parse_insights(text, 5, SummaryType::Detailed);
        assert_eq!(insights, vec!["real insight"]);
    }

    #[test]
    fn test_parse_insights_falls_back_when_empty() {
        let insights = parse_insights("no bullets here", 5, SummaryType::Brief);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].starts_with("Brief analysis completed"));
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "test-model".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            max_tokens: 100,
            temperature: 0.3,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"model\":\"test-model\""));
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"max_tokens\":100"));
    }

    #[test]
    fn test_chat_response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"analysis text"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "analysis text");
    }
}
