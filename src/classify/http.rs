//! HTTP-backed classifier
//!
//! Talks to a chat-completions style endpoint and expects the model to
//! answer with a strict JSON object: `{"is_about": bool, "explanation":
//! string}`. Throttled calls are retried a few times with a flat delay;
//! anything that still fails maps to a negative verdict.

use crate::classify::{Classifier, Language, Verdict};
use crate::config::{ClassifierConfig, SearchTerm};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Classifier speaking to a chat-completions HTTP endpoint
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_attempts: u32,
    retry_delay: Duration,
    keywords_arabic: Vec<String>,
    keywords_english: Vec<String>,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig, terms: &[SearchTerm]) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building classifier HTTP client")?;

        let api_key = config
            .api_key_env
            .as_ref()
            .and_then(|name| std::env::var(name).ok());

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            max_attempts: config.max_attempts,
            retry_delay: Duration::from_secs(30),
            keywords_arabic: terms.iter().map(|t| t.arabic.clone()).collect(),
            keywords_english: terms.iter().map(|t| t.english.clone()).collect(),
        })
    }

    fn prompt(&self, speaker: &str, title: &str, body: &str, language: Language) -> String {
        let keywords = match language {
            Language::Arabic => self.keywords_arabic.join(", "),
            Language::English => self.keywords_english.join(", "),
        };

        format!(
            "Analyze the news article and determine if {speaker} personally made \
             statements about the Israeli-Palestinian conflict.\n\
             \n\
             Instructions:\n\
             - Return true if {speaker} made at least one relevant statement regarding the conflict.\n\
             - Return false if the article only mentions {speaker} but does not contain \
             their direct statements on this topic.\n\
             - Ignore mentions of the conflict that are not statements made by {speaker}.\n\
             - Ignore statements by unrelated parties such as ministry employees or other officials.\n\
             - Statements attributed to {speaker} must relate directly to: {keywords}.\n\
             \n\
             Article:\n\
             {title}\n{body}\n\
             \n\
             Output your final answer as valid JSON with exactly two fields:\n\
             1. \"is_about\": a boolean\n\
             2. \"explanation\": a step-by-step explanation in English of why"
        )
    }

    async fn request_verdict(&self, prompt: &str) -> Result<Verdict> {
        let payload = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("classifier request failed")?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("classifier returned HTTP {}", status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("classifier response was not JSON")?;

        let content = body
            .pointer("/choices/0/message/content")
            .and_then(|value| value.as_str())
            .ok_or_else(|| anyhow!("classifier response missing message content"))?;

        parse_verdict(content)
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        speaker: &str,
        title: &str,
        body: &str,
        language: Language,
    ) -> Verdict {
        let prompt = self.prompt(speaker, title, body, language);

        for attempt in 0..self.max_attempts {
            match self.request_verdict(&prompt).await {
                Ok(verdict) => return verdict,
                Err(error) => {
                    tracing::warn!(
                        "Classifier attempt {}/{} failed for speaker {}: {}",
                        attempt + 1,
                        self.max_attempts,
                        speaker,
                        error
                    );
                    if attempt + 1 < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        // Fail closed: the article is still recorded as processed
        Verdict::negative("classifier error")
    }
}

/// Parses the model's answer, tolerating markdown code fences around the
/// JSON object
fn parse_verdict(content: &str) -> Result<Verdict> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: serde_json::Value =
        serde_json::from_str(trimmed).context("classifier answer was not valid JSON")?;

    let is_about = value
        .get("is_about")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| anyhow!("classifier answer missing is_about"))?;

    let explanation = value
        .get("explanation")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Ok(Verdict {
        is_about,
        explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict_plain_json() {
        let verdict = parse_verdict(r#"{"is_about": true, "explanation": "quoted directly"}"#).unwrap();
        assert!(verdict.is_about);
        assert_eq!(verdict.explanation, "quoted directly");
    }

    #[test]
    fn test_parse_verdict_fenced_json() {
        let content = "```json\n{\"is_about\": false, \"explanation\": \"only mentioned\"}\n```";
        let verdict = parse_verdict(content).unwrap();
        assert!(!verdict.is_about);
    }

    #[test]
    fn test_parse_verdict_missing_field_errors() {
        assert!(parse_verdict(r#"{"explanation": "no flag"}"#).is_err());
        assert!(parse_verdict("not json at all").is_err());
    }

    #[test]
    fn test_parse_verdict_missing_explanation_tolerated() {
        let verdict = parse_verdict(r#"{"is_about": true}"#).unwrap();
        assert!(verdict.is_about);
        assert_eq!(verdict.explanation, "");
    }

    #[test]
    fn test_prompt_uses_language_keywords() {
        let config = ClassifierConfig {
            endpoint: "https://llm.example.com/v1/chat/completions".to_string(),
            model: "m".to_string(),
            api_key_env: None,
            timeout_secs: 10,
            max_attempts: 1,
        };
        let terms = vec![SearchTerm {
            arabic: "غزة".to_string(),
            english: "Gaza".to_string(),
        }];
        let classifier = HttpClassifier::new(&config, &terms).unwrap();

        let arabic = classifier.prompt("speaker", "t", "b", Language::Arabic);
        assert!(arabic.contains("غزة"));

        let english = classifier.prompt("speaker", "t", "b", Language::English);
        assert!(english.contains("Gaza"));
    }
}
