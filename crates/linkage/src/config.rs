use serde::Deserialize;

use crate::error::LinkageError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LinkageConfig {
    pub name: String,
    pub inputs: InputConfig,
    pub bounds: BoundsConfig,
    #[serde(default)]
    pub blocking: BlockingConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Input files, relative to the config file's directory.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub table_a: String,
    pub table_b: String,
    pub matches: String,
    pub unmatches: String,
}

// ---------------------------------------------------------------------------
// Error bounds + blocking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BoundsConfig {
    /// Maximum false positive rate.
    pub mu: f64,
    /// Maximum false negative rate.
    pub lambda: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockingConfig {
    /// Only compare records whose city fields are identical.
    #[serde(default)]
    pub on_city: bool,
}

// ---------------------------------------------------------------------------
// Similarity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    JaroWinkler,
    Levenshtein,
}

impl Default for SimilarityMetric {
    fn default() -> Self {
        Self::JaroWinkler
    }
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JaroWinkler => write!(f, "jaro_winkler"),
            Self::Levenshtein => write!(f, "levenshtein"),
        }
    }
}

/// Scoring policy: metric, category cut points and text normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarityConfig {
    #[serde(default)]
    pub metric: SimilarityMetric,
    /// Scores at or above this are `high`.
    #[serde(default = "default_high")]
    pub high: f64,
    /// Scores at or above this (and below `high`) are `medium`.
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default)]
    pub lowercase: bool,
    /// Words dropped from both values before scoring (case-insensitive).
    #[serde(default)]
    pub ignore_words: Vec<String>,
}

fn default_high() -> f64 {
    0.8
}

fn default_medium() -> f64 {
    0.5
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            metric: SimilarityMetric::default(),
            high: default_high(),
            medium: default_medium(),
            lowercase: false,
            ignore_words: Vec::new(),
        }
    }
}

impl SimilarityConfig {
    pub fn validate(&self) -> Result<(), LinkageError> {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_unit(self.high) || !in_unit(self.medium) {
            return Err(LinkageError::ConfigValidation(format!(
                "similarity thresholds must be in [0, 1], got high={} medium={}",
                self.high, self.medium
            )));
        }
        if self.medium >= self.high {
            return Err(LinkageError::ConfigValidation(format!(
                "similarity.medium ({}) must be below similarity.high ({})",
                self.medium, self.high
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

/// Reject non-finite values and anything outside [0, 1].
pub fn check_bound(name: &'static str, value: f64) -> Result<(), LinkageError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LinkageError::InvalidBound { name, value })
    }
}

impl LinkageConfig {
    pub fn from_toml(input: &str) -> Result<Self, LinkageError> {
        let config: LinkageConfig =
            toml::from_str(input).map_err(|e| LinkageError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LinkageError> {
        check_bound("mu", self.bounds.mu)
            .and_then(|_| check_bound("lambda", self.bounds.lambda))
            .map_err(|e| LinkageError::ConfigValidation(e.to_string()))?;

        self.similarity.validate()?;

        let inputs = [
            ("table_a", &self.inputs.table_a),
            ("table_b", &self.inputs.table_b),
            ("matches", &self.inputs.matches),
            ("unmatches", &self.inputs.unmatches),
        ];
        for (key, path) in inputs {
            if path.trim().is_empty() {
                return Err(LinkageError::ConfigValidation(format!(
                    "inputs.{key} must not be empty"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
