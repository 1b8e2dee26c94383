use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("No phrases configured")]
    EmptyGrammar,

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("{name} must be within 0.0..=1.0, got {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },

    #[error("max_alternatives must be at least 1")]
    NoAlternatives,

    #[error("Config read error: {path} - {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {path} - {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, DetectorError>;
