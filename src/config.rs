use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::accumulator::SelectionPolicy;
use crate::engine::EngineSettings;
use crate::error::{DetectorError, Result};
use crate::grammar::Grammar;

pub const DEFAULT_CONFIG_PATH: &str = "grammar-watch.toml";

/// Detector settings as read from the TOML file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Phrases searched for in every sentence (literal, case-insensitive)
    #[serde(default = "default_phrases")]
    pub phrases: Vec<String>,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_continuous")]
    pub continuous: bool,
    #[serde(default)]
    pub interim_results: bool,
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: u32,
    /// Minimum top-alternative confidence for the confidence-scan policy
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    /// Final sentences more similar than this to the previous one are dropped
    #[serde(default = "default_same_sentence_tolerance")]
    pub same_sentence_tolerance: f64,
    #[serde(default)]
    pub policy: SelectionPolicy,
    /// Stall timeout in milliseconds, 0 disables the watchdog
    #[serde(default = "default_watchdog_ms")]
    pub watchdog_ms: u64,
    /// Minimum seconds between two delivered matches
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            phrases: default_phrases(),
            lang: default_lang(),
            continuous: default_continuous(),
            interim_results: false,
            max_alternatives: default_max_alternatives(),
            confidence: default_confidence(),
            same_sentence_tolerance: default_same_sentence_tolerance(),
            policy: SelectionPolicy::default(),
            watchdog_ms: default_watchdog_ms(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

fn default_phrases() -> Vec<String> {
    vec!["bonjour".to_string(), "salut".to_string()]
}

fn default_lang() -> String {
    "en-US".into()
}

fn default_continuous() -> bool {
    true
}

fn default_max_alternatives() -> u32 {
    1
}

fn default_confidence() -> f32 {
    0.8
}

fn default_same_sentence_tolerance() -> f64 {
    0.5
}

fn default_watchdog_ms() -> u64 {
    2000
}

fn default_cooldown_secs() -> u64 {
    30
}

impl DetectorConfig {
    /// Load from `path`; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| DetectorError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text).map_err(|source| DetectorError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            continuous: self.continuous,
            lang: self.lang.clone(),
            interim_results: self.interim_results,
            max_alternatives: self.max_alternatives,
        }
    }

    /// Validate and compile into the session's immutable configuration
    pub fn build(&self) -> Result<Configuration> {
        check_ratio("confidence", self.confidence as f64)?;
        check_ratio("same_sentence_tolerance", self.same_sentence_tolerance)?;
        if self.max_alternatives == 0 {
            return Err(DetectorError::NoAlternatives);
        }

        Ok(Configuration {
            grammar: Grammar::from_phrases(&self.phrases)?,
            engine: self.engine_settings(),
            confidence: self.confidence,
            same_sentence_tolerance: self.same_sentence_tolerance,
            policy: self.policy,
            watchdog: (self.watchdog_ms > 0).then(|| Duration::from_millis(self.watchdog_ms)),
        })
    }
}

fn check_ratio(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DetectorError::RatioOutOfRange { name, value })
    }
}

/// Compiled settings, fixed for the lifetime of a session
#[derive(Debug, Clone)]
pub struct Configuration {
    grammar: Grammar,
    engine: EngineSettings,
    confidence: f32,
    same_sentence_tolerance: f64,
    policy: SelectionPolicy,
    watchdog: Option<Duration>,
}

impl Configuration {
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn engine(&self) -> &EngineSettings {
        &self.engine
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn same_sentence_tolerance(&self) -> f64 {
        self.same_sentence_tolerance
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn watchdog(&self) -> Option<Duration> {
        self.watchdog
    }
}
