//! Field extraction from supplier pages
//!
//! The marketplace has rendered the same logical fields in several markup
//! layouts over the years, and old layouts linger on some pages. Each field
//! is extracted by an ordered set of layout variants; a miss in every variant
//! resolves to "N/A" (or no reviews) and never to an error.

mod company;
mod rating;
mod reviews;
mod satisfaction;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::collapse_whitespace;
use crate::record::ExtractionRecord;

pub use company::extract_company_name;
pub use rating::{extract_overall_rating, OverallRating, RatingLayout};
pub use reviews::{css_width_to_stars, extract_reviews, ReviewLayout};
pub use satisfaction::{
    extract_user_satisfaction, extract_user_satisfaction_with, MetricPrecedence,
    SatisfactionLayout,
};

/// A fetched supplier page: the raw markup plus its parsed document
pub struct Page {
    html: String,
    document: Html,
}

impl Page {
    pub fn parse(html: impl Into<String>) -> Self {
        let html = html.into();
        let document = Html::parse_document(&html);
        Self { html, document }
    }

    /// Raw markup, for patterns the DOM does not carry
    pub fn raw_html(&self) -> &str {
        &self.html
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn select_one(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.document.select(selector).next()
    }

    /// Visible text of the page body, without script and style contents
    pub fn visible_text(&self) -> String {
        let root = self
            .select_one(&BODY)
            .unwrap_or_else(|| self.document.root_element());

        let mut parts = Vec::new();
        for node in root.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node
                .parent()
                .and_then(ElementRef::wrap)
                .map(|parent| matches!(parent.value().name(), "script" | "style" | "noscript"))
                .unwrap_or(false);
            if !hidden && !text.trim().is_empty() {
                parts.push(text.trim().to_string());
            }
        }
        collapse_whitespace(&parts.join(" "))
    }
}

static BODY: Lazy<Selector> = Lazy::new(|| selector("body"));

/// Compile a built-in selector
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid built-in selector")
}

/// Text content of an element with whitespace collapsed
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Options that change how records are assembled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Which layout wins when two satisfaction layouts report the same metric
    #[serde(default)]
    pub metric_precedence: MetricPrecedence,
}

/// Extract the full record (rating, metrics, reviews) from a page
pub fn extract_record(page: &Page, options: &ExtractOptions) -> ExtractionRecord {
    let overall = extract_overall_rating(page);
    let metrics = extract_user_satisfaction_with(page, options.metric_precedence);
    let reviews = extract_reviews(page);

    debug!(
        rating = ?overall.rating,
        total = ?overall.total,
        reviews = reviews.len(),
        "extracted record"
    );

    ExtractionRecord {
        rating: overall.rating,
        total_ratings: overall.total,
        metrics,
        reviews,
    }
}
