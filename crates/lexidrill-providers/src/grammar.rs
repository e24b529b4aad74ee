//! Grammar checker implementations.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use lexidrill_core::model::GrammarIssue;
use lexidrill_core::traits::GrammarChecker;

use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.languagetool.org";
const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const MAX_SUGGESTIONS: usize = 5;

/// LanguageTool HTTP API checker (public server or self-hosted).
pub struct LanguageToolChecker {
    base_url: String,
    language: String,
    client: reqwest::Client,
}

impl LanguageToolChecker {
    pub fn new(base_url: Option<String>, language: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            language: language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            client,
        }
    }
}

#[derive(Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<CheckMatch>,
}

#[derive(Deserialize)]
struct CheckMatch {
    message: String,
    #[serde(default)]
    replacements: Vec<Replacement>,
}

#[derive(Deserialize)]
struct Replacement {
    value: String,
}

#[async_trait]
impl GrammarChecker for LanguageToolChecker {
    fn name(&self) -> &str {
        "languagetool"
    }

    #[instrument(skip(self, text), fields(language = %self.language, len = text.len()))]
    async fn check(&self, text: &str) -> anyhow::Result<Vec<GrammarIssue>> {
        let response = self
            .client
            .post(format!("{}/v2/check", self.base_url))
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, DEFAULT_TIMEOUT_SECS))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, body).into());
        }

        let parsed: CheckResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| GrammarIssue {
                message: m.message,
                suggestions: m
                    .replacements
                    .into_iter()
                    .take(MAX_SUGGESTIONS)
                    .map(|r| r.value)
                    .collect(),
            })
            .collect())
    }
}

/// Checker used when grading is turned off: every sentence is clean.
pub struct DisabledChecker;

#[async_trait]
impl GrammarChecker for DisabledChecker {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn check(&self, _text: &str) -> anyhow::Result<Vec<GrammarIssue>> {
        Ok(Vec::new())
    }
}
