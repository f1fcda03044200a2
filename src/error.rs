use thiserror::Error;

#[derive(Error, Debug)]
pub enum RatescoutError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Could not read page {path}: {source}")]
    PageReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Model not installed: {0}")]
    ModelUnavailable(String),

    #[error("Model call failed: {0}")]
    ModelFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid batch line {line}: {reason}")]
    BatchLineError { line: usize, reason: String },
}

impl RatescoutError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<String> {
        match self {
            RatescoutError::HttpError(_) => Some(
                "Is Ollama running? Start it with `ollama serve`, then run `ratescout doctor`".into(),
            ),
            RatescoutError::ModelUnavailable(model) => {
                Some(format!("Install the model first:\n  ollama pull {}", model))
            }
            RatescoutError::PageReadError { .. } => Some(
                "Pass the path of a saved HTML page, e.g. `ratescout extract \"ABC Cement\" page.html`".into(),
            ),
            RatescoutError::ConfigError(_) | RatescoutError::TomlError(_) => Some(
                "Check your config with `ratescout config`, or set RATESCOUT_CONFIG to another file".into(),
            ),
            RatescoutError::BatchLineError { .. } => Some(
                "Batch files hold one `company<TAB>path` pair per line; `#` starts a comment".into(),
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RatescoutError>;
