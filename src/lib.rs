pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod matcher;
pub mod normalize;
pub mod ollama;
pub mod pipeline;
pub mod record;
pub mod report;

pub use error::{RatescoutError, Result};
