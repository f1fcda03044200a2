//! Model-backed repair of incomplete extractions
//!
//! The model sees the page's visible text and fills in satisfaction metrics
//! and reviews using a fixed JSON schema. Every call runs on its own worker
//! thread and the caller waits at most the configured budget; a worker that
//! overruns is abandoned and its result, if it ever arrives, is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::error::Result;
use crate::normalize::normalize_text;
use crate::ollama::{ChatModel, OllamaClient};
use crate::record::{Metrics, Review};

// qwen3 and similar models may emit a reasoning block before the answer
static THINK_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<think>.*?</think>").expect("Invalid think block regex")
});

const NORMALIZE_PROMPT: &str = r#"You normalize supplier review data.

Rules:
- Missing values -> "N/A"
- Stars must be a whole number from 1 to 5
- Output VALID JSON ONLY, no other text

TEXT:
{{text}}

OUTPUT:
{
  "metrics": {
    "response": "N/A",
    "quality": "N/A",
    "delivery": "N/A"
  },
  "reviews": [
    {
      "name": "User",
      "stars": "4",
      "product": "Product",
      "text": "Review text"
    }
  ]
}"#;

/// Metrics and reviews recovered by the model. Empty on any failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPatch {
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl FallbackPatch {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.reviews.is_empty()
    }
}

/// Build the fixed-schema instruction prompt
pub fn build_prompt(text: &str) -> String {
    NORMALIZE_PROMPT.replace("{{text}}", text)
}

/// Strip markdown code fencing (```json ... ```) and reasoning blocks
fn strip_code_fencing(s: &str) -> String {
    let without_think = THINK_BLOCK_RE.replace_all(s, "");
    let trimmed = without_think.trim();

    // Prefer an explicit JSON block even when prose surrounds it
    if let Some(json_start) = trimmed.find("```json") {
        let after_fence = &trimmed[json_start + 7..];
        if let Some(end_fence) = after_fence.find("```") {
            return after_fence[..end_fence].trim().to_string();
        }
        return after_fence.trim().to_string();
    }

    trimmed.replace("```", "").trim().to_string()
}

/// Parse a raw completion into a patch
pub fn parse_completion(raw: &str) -> std::result::Result<FallbackPatch, serde_json::Error> {
    let json_text = strip_code_fencing(raw);
    let mut patch: FallbackPatch = serde_json::from_str(&json_text)?;
    // Reviews the model could not fill at all carry no information
    patch.reviews.retain(|r| *r != Review::default());
    Ok(patch)
}

/// Worker body: call the model and parse, never failing
fn run_worker(model: &dyn ChatModel, prompt: &str) -> FallbackPatch {
    let raw = match model.chat(prompt) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "LLM call failed");
            return FallbackPatch::default();
        }
    };

    match parse_completion(&raw) {
        Ok(patch) => patch,
        Err(e) => {
            warn!(error = %e, "LLM returned malformed output");
            debug!(raw = %raw, "malformed completion");
            FallbackPatch::default()
        }
    }
}

/// Fills gaps in extraction records using a local model under a hard time budget
pub struct LlmNormalizer {
    model: Arc<dyn ChatModel>,
    timeout: Duration,
    text_limit: usize,
    min_text_len: usize,
}

impl LlmNormalizer {
    /// Connect to Ollama and make sure the configured model is installed.
    ///
    /// Fails with `ModelUnavailable` rather than letting every later call
    /// run into the same failure.
    pub fn connect(config: &LlmConfig) -> Result<Self> {
        let client = OllamaClient::new(config);
        client.ensure_model()?;
        info!(model = %client.model(), "using model");
        Ok(Self::with_model(Arc::new(client), config))
    }

    /// Use an already constructed backend
    pub fn with_model(model: Arc<dyn ChatModel>, config: &LlmConfig) -> Self {
        Self {
            model,
            timeout: config.timeout(),
            text_limit: config.text_limit,
            min_text_len: config.min_text_len,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the model for metrics and reviews, within the configured budget
    pub fn call_safe(&self, text: &str) -> FallbackPatch {
        self.call_safe_with_timeout(text, self.timeout)
    }

    /// Ask the model for metrics and reviews, waiting at most `timeout`.
    ///
    /// Returns an empty patch when the text is too short to be worth a call,
    /// when the model fails or answers with something other than the schema,
    /// and when the budget runs out.
    pub fn call_safe_with_timeout(&self, text: &str, timeout: Duration) -> FallbackPatch {
        let text = normalize_text(text, self.text_limit);
        let len = text.chars().count();
        if len < self.min_text_len {
            debug!(len, "text too short for LLM");
            return FallbackPatch::default();
        }

        let prompt = build_prompt(&text);
        let (tx, rx) = mpsc::sync_channel::<FallbackPatch>(1);
        let cancelled = Arc::new(AtomicBool::new(false));

        let worker_model = Arc::clone(&self.model);
        let worker_cancelled = Arc::clone(&cancelled);
        let spawned = thread::Builder::new()
            .name("llm-worker".into())
            .spawn(move || {
                let patch = run_worker(worker_model.as_ref(), &prompt);
                if !worker_cancelled.load(Ordering::Acquire) {
                    // Receiver may already be gone; a late result is dropped
                    let _ = tx.try_send(patch);
                }
            });

        if let Err(e) = spawned {
            warn!(error = %e, "could not start LLM worker");
            return FallbackPatch::default();
        }

        match rx.recv_timeout(timeout) {
            Ok(patch) => patch,
            Err(RecvTimeoutError::Timeout) => {
                cancelled.store(true, Ordering::Release);
                warn!(timeout_ms = timeout.as_millis() as u64, "LLM timeout, worker abandoned");
                FallbackPatch::default()
            }
            Err(RecvTimeoutError::Disconnected) => FallbackPatch::default(),
        }
    }
}
