//! Merriam-Webster dictionary and thesaurus provider.
//!
//! Words are drawn from the built-in [`VOCABULARY`](crate::vocabulary::VOCABULARY)
//! and defined through the Collegiate API. Synonyms and antonyms come from
//! the Collegiate Thesaurus API.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use tracing::instrument;

use lexidrill_core::model::WordEntry;
use lexidrill_core::traits::{Relation, Thesaurus, WordSource};
use lexidrill_core::LookupFailure;

use crate::error::ProviderError;
use crate::vocabulary::{self, VOCABULARY};

const DEFAULT_BASE_URL: &str = "https://dictionaryapi.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_RELATED: usize = 5;

/// Shown when the dictionary has no short definition for a word.
pub const NO_DEFINITION: &str = "No definition available.";

/// Merriam-Webster API client.
pub struct MerriamWebster {
    dictionary_key: String,
    thesaurus_key: String,
    base_url: String,
    vocabulary: Vec<String>,
    client: reqwest::Client,
}

impl MerriamWebster {
    pub fn new(dictionary_key: &str, thesaurus_key: &str, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            dictionary_key: dictionary_key.to_string(),
            thesaurus_key: thesaurus_key.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            vocabulary: VOCABULARY.iter().map(|w| w.to_string()).collect(),
            client,
        }
    }

    /// Draw words from `words` instead of the built-in list.
    pub fn with_vocabulary(mut self, words: Vec<String>) -> Self {
        self.vocabulary = words;
        self
    }

    /// The first short definition of `word`, or `None` if the dictionary
    /// has no entry for it.
    #[instrument(skip(self))]
    pub async fn define(&self, word: &str) -> Result<Option<String>, LookupFailure> {
        let entries = self
            .entries("collegiate", word, &self.dictionary_key)
            .await?;
        Ok(entries.into_iter().find_map(|entry| match entry {
            MwEntry::Entry(e) => e.shortdef.into_iter().next(),
            MwEntry::Suggestion(_) => None,
        }))
    }

    async fn entries(
        &self,
        reference: &str,
        word: &str,
        key: &str,
    ) -> Result<Vec<MwEntry>, LookupFailure> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| LookupFailure::Parse(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| LookupFailure::Parse("base URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(["api", "v3", "references", reference, "json", word]);

        let response = self
            .client
            .get(url)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, DEFAULT_TIMEOUT_SECS))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, DEFAULT_TIMEOUT_SECS))?;
        if status >= 400 {
            return Err(ProviderError::from_status(status, body).into());
        }

        // An unknown key still answers 200, with a plain-text body.
        if body.trim_start().starts_with("Invalid API key") {
            return Err(LookupFailure::AuthenticationFailed(body.trim().to_string()));
        }

        serde_json::from_str(&body).map_err(|e| LookupFailure::Parse(e.to_string()))
    }
}

/// A Merriam-Webster result: either a full entry or, for unknown words,
/// a bare spelling suggestion.
#[derive(Deserialize)]
#[serde(untagged)]
enum MwEntry {
    Entry(MwDefinition),
    Suggestion(#[allow(dead_code)] String),
}

#[derive(Deserialize)]
struct MwDefinition {
    #[serde(default)]
    shortdef: Vec<String>,
    #[serde(default)]
    meta: Option<MwMeta>,
}

#[derive(Deserialize)]
struct MwMeta {
    #[serde(default)]
    syns: Vec<Vec<String>>,
    #[serde(default)]
    ants: Vec<Vec<String>>,
}

#[async_trait]
impl WordSource for MerriamWebster {
    fn name(&self) -> &str {
        "merriam-webster"
    }

    #[instrument(skip(self))]
    async fn fetch(&self, n: usize) -> Result<Vec<WordEntry>, LookupFailure> {
        let words = vocabulary::sample(&self.vocabulary, n);
        let definitions = try_join_all(words.iter().map(|w| self.define(w))).await?;

        Ok(words
            .into_iter()
            .zip(definitions)
            .map(|(word, definition)| {
                WordEntry::new(word, definition.unwrap_or_else(|| NO_DEFINITION.to_string()))
            })
            .collect())
    }
}

#[async_trait]
impl Thesaurus for MerriamWebster {
    #[instrument(skip(self))]
    async fn related(
        &self,
        word: &str,
        relation: Relation,
    ) -> Result<Vec<String>, LookupFailure> {
        let entries = self.entries("thesaurus", word, &self.thesaurus_key).await?;
        let first = entries.into_iter().find_map(|entry| match entry {
            MwEntry::Entry(e) => e.meta,
            MwEntry::Suggestion(_) => None,
        });

        Ok(first
            .and_then(|meta| {
                let groups = match relation {
                    Relation::Synonym => meta.syns,
                    Relation::Antonym => meta.ants,
                };
                groups.into_iter().next()
            })
            .map(|group| group.into_iter().take(MAX_RELATED).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> MerriamWebster {
        MerriamWebster::new("dict-key", "thes-key", Some(server.uri()))
    }

    #[tokio::test]
    async fn fetch_defines_sampled_words() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/references/collegiate/json/eloquent"))
            .and(query_param("key", "dict-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"meta": {"id": "eloquent"}, "shortdef": ["marked by forceful and fluent expression"]}
            ])))
            .mount(&server)
            .await;

        let source = provider(&server).with_vocabulary(vec!["eloquent".into()]);
        let words = source.fetch(5).await.unwrap();
        assert_eq!(
            words,
            vec![WordEntry::new(
                "eloquent",
                "marked by forceful and fluent expression"
            )]
        );
    }

    #[tokio::test]
    async fn unknown_word_falls_back_to_placeholder_definition() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/references/collegiate/json/zestt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!(["zest", "zesty"])),
            )
            .mount(&server)
            .await;

        let source = provider(&server).with_vocabulary(vec!["zestt".into()]);
        let words = source.fetch(1).await.unwrap();
        assert_eq!(words[0].definition, NO_DEFINITION);
    }

    #[tokio::test]
    async fn invalid_key_is_authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("Invalid API key. Not subscribed for this reference."),
            )
            .mount(&server)
            .await;

        let source = provider(&server).with_vocabulary(vec!["abate".into()]);
        let err = source.fetch(1).await.unwrap_err();
        assert!(matches!(err, LookupFailure::AuthenticationFailed(_)));
        assert!(err.is_permanent());
    }

    #[tokio::test]
    async fn server_error_fails_the_whole_batch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let source = provider(&server).with_vocabulary(vec!["abate".into(), "zest".into()]);
        let err = source.fetch(2).await.unwrap_err();
        assert!(matches!(err, LookupFailure::ApiError { status: 503, .. }));
    }

    #[tokio::test]
    async fn synonyms_and_antonyms_from_first_entry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/references/thesaurus/json/happy"))
            .and(query_param("key", "thes-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "meta": {
                        "syns": [["glad", "cheerful", "joyful", "merry", "jolly", "upbeat"], ["lucky"]],
                        "ants": [["sad", "unhappy"]]
                    }
                },
                {"meta": {"syns": [["ignored"]], "ants": []}}
            ])))
            .mount(&server)
            .await;

        let thesaurus = provider(&server);
        let syns = thesaurus.related("happy", Relation::Synonym).await.unwrap();
        assert_eq!(syns, vec!["glad", "cheerful", "joyful", "merry", "jolly"]);
        let ants = thesaurus.related("happy", Relation::Antonym).await.unwrap();
        assert_eq!(ants, vec!["sad", "unhappy"]);
    }

    #[tokio::test]
    async fn thesaurus_suggestions_mean_no_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/references/thesaurus/json/hapy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["happy"])))
            .mount(&server)
            .await;

        let related = provider(&server)
            .related("hapy", Relation::Antonym)
            .await
            .unwrap();
        assert!(related.is_empty());
    }
}
