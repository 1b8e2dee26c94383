use serde::{Deserialize, Serialize};

/// One candidate transcript for a result entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub transcript: String,
    #[serde(default = "full_confidence")]
    pub confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

/// One entry of the engine's ordered result list.
///
/// Alternatives are ordered best-first; earlier entries in the list are stable
/// prefixes of the utterance turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub is_final: bool,
}

impl RawResult {
    pub fn new(transcript: impl Into<String>, confidence: f32, is_final: bool) -> Self {
        Self {
            alternatives: vec![Alternative {
                transcript: transcript.into(),
                confidence,
            }],
            is_final,
        }
    }

    pub fn interim(transcript: impl Into<String>, confidence: f32) -> Self {
        Self::new(transcript, confidence, false)
    }

    pub fn finalized(transcript: impl Into<String>, confidence: f32) -> Self {
        Self::new(transcript, confidence, true)
    }

    pub fn top(&self) -> Option<&Alternative> {
        self.alternatives.first()
    }

    /// Top transcript, or "" when the engine sent no alternatives
    pub fn transcript(&self) -> &str {
        self.top().map(|a| a.transcript.as_str()).unwrap_or("")
    }

    pub fn confidence(&self) -> f32 {
        self.top().map(|a| a.confidence).unwrap_or(0.0)
    }
}

/// Best current hypothesis for an utterance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sentence {
    pub value: String,
    pub matched: bool,
    pub is_final: bool,
}

impl Sentence {
    pub fn new(value: impl Into<String>, matched: bool, is_final: bool) -> Self {
        Self {
            value: value.into(),
            matched,
            is_final,
        }
    }
}
