//! One supplier page in, at most one report out

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::extract::{extract_company_name, extract_record, ExtractOptions, Page};
use crate::llm::{FallbackPatch, LlmNormalizer};
use crate::matcher;
use crate::record::{ExtractionRecord, MetricKind, NA};

/// A page that passed the name check, with everything extracted from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReport {
    pub input_name: String,
    pub matched_name: String,
    pub record: ExtractionRecord,
    /// The model filled at least one gap
    #[serde(default)]
    pub used_fallback: bool,
}

/// Result of processing one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page belongs to some other company; nothing is reported
    Skipped { matched_name: Option<String> },
    Extracted(PageReport),
}

/// Gate on the company name, extract, and repair gaps with the model.
///
/// Records are produced even when every field is "N/A", so that markup
/// drift shows up in the output instead of silently dropping pages.
pub fn process_page(
    input_name: &str,
    html: &str,
    options: &ExtractOptions,
    fallback: Option<&LlmNormalizer>,
) -> PageOutcome {
    let page = Page::parse(html);
    let matched_name = extract_company_name(&page);

    if !matcher::matches(input_name, matched_name.as_deref().unwrap_or(NA)) {
        info!(input = input_name, matched = ?matched_name, "name mismatch, skipping page");
        return PageOutcome::Skipped { matched_name };
    }

    let mut record = extract_record(&page, options);
    let mut used_fallback = false;

    if let Some(llm) = fallback {
        if record.needs_fallback() {
            let patch = llm.call_safe(&page.visible_text());
            used_fallback = merge_fallback(&mut record, patch);
            debug!(used_fallback, "fallback applied");
        }
    }

    PageOutcome::Extracted(PageReport {
        input_name: input_name.to_string(),
        matched_name: matched_name.unwrap_or_else(|| NA.to_string()),
        record,
        used_fallback,
    })
}

/// Fill unresolved fields from a model patch. Returns whether anything changed.
///
/// Extracted values always win: only "N/A" metrics are filled, and model
/// reviews are used only when the page yielded none.
pub fn merge_fallback(record: &mut ExtractionRecord, patch: FallbackPatch) -> bool {
    let mut changed = false;

    for kind in MetricKind::ALL {
        if record.metrics.get(kind).is_none() {
            if let Some(value) = patch.metrics.get(kind) {
                record.metrics.set(kind, value.to_string());
                changed = true;
            }
        }
    }

    if record.reviews.is_empty() && !patch.reviews.is_empty() {
        record.reviews = patch.reviews;
        changed = true;
    }

    changed
}
