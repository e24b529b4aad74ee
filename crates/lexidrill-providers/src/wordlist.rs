//! Offline word source and thesaurus backed by plain-text word lists.

use std::path::Path;

use async_trait::async_trait;

use lexidrill_core::model::WordEntry;
use lexidrill_core::traits::{Relation, Thesaurus, WordSource};
use lexidrill_core::LookupFailure;

use crate::vocabulary;

/// Definition attached to every word drawn from a local list.
pub const LOCAL_DEFINITION: &str = "Definition not available from local wordlist.";

/// Words loaded from a file, one per line.
#[derive(Debug, Clone)]
pub struct LocalWordList {
    words: Vec<String>,
}

impl LocalWordList {
    /// Load a word list. Blank lines are skipped; an empty list is an error.
    pub fn load(path: &Path) -> Result<Self, LookupFailure> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LookupFailure::WordList(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_words(content.lines().map(str::to_string).collect()).map_err(|_| {
            LookupFailure::WordList(format!("{} contains no words", path.display()))
        })
    }

    pub fn from_words(words: Vec<String>) -> Result<Self, LookupFailure> {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return Err(LookupFailure::WordList("word list is empty".into()));
        }
        Ok(Self { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[async_trait]
impl WordSource for LocalWordList {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(&self, n: usize) -> Result<Vec<WordEntry>, LookupFailure> {
        Ok(vocabulary::sample(&self.words, n)
            .into_iter()
            .map(|word| WordEntry::new(word, LOCAL_DEFINITION))
            .collect())
    }
}

/// Entries returned per local thesaurus lookup.
const LOCAL_RELATED: usize = 5;

/// Thesaurus backed by a synonym list and an antonym list, one entry per line.
///
/// The lists are not keyed by word: a lookup returns up to five distinct
/// entries picked at random from the list for the relation. A relation
/// without a list returns nothing.
#[derive(Debug, Clone, Default)]
pub struct LocalThesaurus {
    synonyms: Option<LocalWordList>,
    antonyms: Option<LocalWordList>,
}

impl LocalThesaurus {
    pub fn load(
        synonyms: Option<&Path>,
        antonyms: Option<&Path>,
    ) -> Result<Self, LookupFailure> {
        Ok(Self {
            synonyms: synonyms.map(LocalWordList::load).transpose()?,
            antonyms: antonyms.map(LocalWordList::load).transpose()?,
        })
    }

    pub fn from_lists(
        synonyms: Option<LocalWordList>,
        antonyms: Option<LocalWordList>,
    ) -> Self {
        Self { synonyms, antonyms }
    }
}

#[async_trait]
impl Thesaurus for LocalThesaurus {
    async fn related(
        &self,
        _word: &str,
        relation: Relation,
    ) -> Result<Vec<String>, LookupFailure> {
        let list = match relation {
            Relation::Synonym => &self.synonyms,
            Relation::Antonym => &self.antonyms,
        };
        Ok(list
            .as_ref()
            .map(|list| vocabulary::sample(&list.words, LOCAL_RELATED))
            .unwrap_or_default())
    }
}

/// Thesaurus used when neither a thesaurus API nor local lists are configured.
pub struct NoThesaurus;

#[async_trait]
impl Thesaurus for NoThesaurus {
    async fn related(
        &self,
        _word: &str,
        _relation: Relation,
    ) -> Result<Vec<String>, LookupFailure> {
        Ok(Vec::new())
    }
}
