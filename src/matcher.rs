// src/matcher.rs
use crate::source::Posting;

/// Ordered, lowercase keyword list configured once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    words: Vec<String>,
}

impl KeywordSet {
    /// Trims, lowercases and drops empties and repeats; first occurrence keeps its slot.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = Vec::new();
        for it in items {
            let w = it.as_ref().trim().to_lowercase();
            if !w.is_empty() && !words.contains(&w) {
                words.push(w);
            }
        }
        Self { words }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Keywords found in `posting`'s title + description, in set order.
    ///
    /// Plain substring test: "aws" also hits "laws".
    pub fn matches(&self, posting: &Posting) -> Vec<String> {
        let haystack = format!("{} {}", posting.title, posting.description).to_lowercase();
        self.words
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .cloned()
            .collect()
    }
}

/// A posting plus the keywords it hit. Never persisted.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub posting: Posting,
    pub matched: Vec<String>,
}

impl MatchResult {
    pub fn classify(posting: Posting, keywords: &KeywordSet) -> Option<Self> {
        let matched = keywords.matches(&posting);
        if matched.is_empty() {
            return None;
        }
        Some(Self { posting, matched })
    }
}
