use std::borrow::Cow;
use std::collections::HashSet;

use crate::config::{SimilarityConfig, SimilarityMetric};
use crate::model::SimilarityCategory;

/// Continuous string similarity plus its discretization into categories.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    metric: SimilarityMetric,
    high: f64,
    medium: f64,
    lowercase: bool,
    ignore_words: HashSet<String>,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(&SimilarityConfig::default())
    }
}

impl SimilarityScorer {
    pub fn new(config: &SimilarityConfig) -> Self {
        Self {
            metric: config.metric,
            high: config.high,
            medium: config.medium,
            lowercase: config.lowercase,
            ignore_words: config.ignore_words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Similarity in [0, 1]. Both empty scores 1.0, one empty scores 0.0.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        let a = self.normalize(a);
        let b = self.normalize(b);
        // Canonical argument order keeps the result symmetric to the bit.
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        match self.metric {
            SimilarityMetric::JaroWinkler => strsim::jaro_winkler(&a, &b),
            SimilarityMetric::Levenshtein => strsim::normalized_levenshtein(&a, &b),
        }
    }

    pub fn categorize(&self, score: f64) -> SimilarityCategory {
        if score >= self.high {
            SimilarityCategory::High
        } else if score >= self.medium {
            SimilarityCategory::Medium
        } else {
            SimilarityCategory::Low
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> SimilarityCategory {
        self.categorize(self.score(a, b))
    }

    fn normalize<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if !self.lowercase && self.ignore_words.is_empty() {
            return Cow::Borrowed(value);
        }
        let words: Vec<String> = value
            .split_whitespace()
            .filter(|w| !self.ignore_words.contains(&w.to_lowercase()))
            .map(|w| if self.lowercase { w.to_lowercase() } else { w.to_string() })
            .collect();
        Cow::Owned(words.join(" "))
    }
}
