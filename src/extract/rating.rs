use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::Serialize;
use tracing::debug;

use super::{selector, text_of, Page};
use crate::record::Rating;

// Testimonial pages embed the score in a script object the DOM never shows
static EMBEDDED_RATING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"OVERALL_RATING"\s*:\s*"([\d.]+)".*?"TOTAL_RATINGS_COUNT"\s*:\s*"(\d+)""#)
        .expect("Invalid embedded rating regex")
});

static COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d[\d,]*").expect("Invalid count regex")
});

static FM_STARS: Lazy<Selector> = Lazy::new(|| selector("div.FM_s .FM_str .FM_bo"));
static FM_STARS_COUNT: Lazy<Selector> = Lazy::new(|| selector("div.FM_s p"));
static GRADIENT: Lazy<Selector> = Lazy::new(|| selector("p.rtng-get span.fwb"));
static GRADIENT_COUNT: Lazy<Selector> = Lazy::new(|| selector("p.rtng-cont"));
static SUPPLIER_CARD: Lazy<Selector> = Lazy::new(|| selector("div.supplierInfoDiv span.bo.color"));
static FM_LEGACY: Lazy<Selector> = Lazy::new(|| selector(".FM_str .FM_bo"));
static TESTIMONIAL: Lazy<Selector> = Lazy::new(|| selector("span.first-span"));

/// Overall score and how many ratings it is based on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverallRating {
    pub rating: Option<Rating>,
    pub total: Option<u64>,
}

/// Known renderings of the overall rating, newest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingLayout {
    /// `"OVERALL_RATING"` / `"TOTAL_RATINGS_COUNT"` pair inside a script
    EmbeddedJson,
    /// Ratings & Reviews section, current layout
    FmStars,
    /// Gradient rating block
    Gradient,
    /// Rating shown on the supplier card
    SupplierCard,
    /// Ratings block without a count
    FmLegacy,
    /// Oldest testimonial layout
    Testimonial,
}

impl RatingLayout {
    /// Probe order. The first layout that is present on the page decides.
    pub const PRIORITY: [RatingLayout; 6] = [
        RatingLayout::EmbeddedJson,
        RatingLayout::FmStars,
        RatingLayout::Gradient,
        RatingLayout::SupplierCard,
        RatingLayout::FmLegacy,
        RatingLayout::Testimonial,
    ];

    /// `None` when this layout is absent. A present layout may still carry
    /// an unusable rating, which resolves to "N/A" without trying older ones.
    pub fn probe(self, page: &Page) -> Option<OverallRating> {
        match self {
            RatingLayout::EmbeddedJson => {
                let caps = EMBEDDED_RATING_RE.captures(page.raw_html())?;
                Some(OverallRating {
                    rating: caps.get(1).and_then(|m| Rating::parse(m.as_str())),
                    total: caps.get(2).and_then(|m| parse_count(m.as_str())),
                })
            }
            RatingLayout::FmStars => {
                let score = page.select_one(&FM_STARS)?;
                let count = page.select_one(&FM_STARS_COUNT);
                Some(rating_with_count(score, count))
            }
            RatingLayout::Gradient => {
                let score = page.select_one(&GRADIENT)?;
                let count = page.select_one(&GRADIENT_COUNT);
                Some(rating_with_count(score, count))
            }
            RatingLayout::SupplierCard => {
                let score = page.select_one(&SUPPLIER_CARD)?;
                let count = score
                    .next_siblings()
                    .filter_map(ElementRef::wrap)
                    .find(|sibling| sibling.value().name() == "span");
                Some(rating_with_count(score, count))
            }
            RatingLayout::FmLegacy => {
                let score = page.select_one(&FM_LEGACY)?;
                Some(rating_with_count(score, None))
            }
            RatingLayout::Testimonial => {
                let score = page.select_one(&TESTIMONIAL)?;
                Some(rating_with_count(score, None))
            }
        }
    }
}

fn rating_with_count(score: ElementRef<'_>, count: Option<ElementRef<'_>>) -> OverallRating {
    OverallRating {
        rating: Rating::parse(&text_of(score)),
        total: count.and_then(|el| parse_count(&text_of(el))),
    }
}

/// First number in a count label such as "(1,204 ratings)"
fn parse_count(text: &str) -> Option<u64> {
    let digits: String = COUNT_RE
        .find(text)?
        .as_str()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Overall rating from the first layout present on the page
pub fn extract_overall_rating(page: &Page) -> OverallRating {
    for layout in RatingLayout::PRIORITY {
        if let Some(found) = layout.probe(page) {
            debug!(?layout, rating = ?found.rating, total = ?found.total, "rating layout matched");
            return found;
        }
    }
    OverallRating::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating_of(html: &str) -> OverallRating {
        extract_overall_rating(&Page::parse(html))
    }

    fn rating_str(found: &OverallRating) -> Option<&str> {
        found.rating.as_ref().map(Rating::as_str)
    }

    #[test]
    fn test_embedded_json() {
        let found = rating_of(
            r#"<script>var d = {"OVERALL_RATING": "4.2", "X": 1,
            "TOTAL_RATINGS_COUNT":"57"};</script><span class="first-span">3.0</span>"#,
        );
        assert_eq!(rating_str(&found), Some("4.2"));
        assert_eq!(found.total, Some(57));
    }

    #[test]
    fn test_embedded_json_out_of_range_rating() {
        let found = rating_of(r#"<script>{"OVERALL_RATING":"0","TOTAL_RATINGS_COUNT":"3"}</script>"#);
        assert_eq!(found.rating, None);
        assert_eq!(found.total, Some(3));
    }

    #[test]
    fn test_fm_stars_with_count() {
        let found = rating_of(
            r#"<div class="FM_s"><div class="FM_str"><span class="FM_bo">4.5/5</span></div>
            <p>Based on 1,204 ratings</p></div>"#,
        );
        assert_eq!(rating_str(&found), Some("4.5"));
        assert_eq!(found.total, Some(1204));
    }

    #[test]
    fn test_gradient_block() {
        let found = rating_of(
            r#"<p class="rtng-get"><span class="fwb">3.9</span></p><p class="rtng-cont">(88)</p>"#,
        );
        assert_eq!(rating_str(&found), Some("3.9"));
        assert_eq!(found.total, Some(88));
    }

    #[test]
    fn test_supplier_card_sibling_count() {
        let found = rating_of(
            r#"<div class="supplierInfoDiv"><span class="bo color">4.1</span><i></i><span>(23)</span></div>"#,
        );
        assert_eq!(rating_str(&found), Some("4.1"));
        assert_eq!(found.total, Some(23));
    }

    #[test]
    fn test_supplier_card_without_sibling() {
        let found = rating_of(r#"<div class="supplierInfoDiv"><span class="bo color">5</span></div>"#);
        assert_eq!(rating_str(&found), Some("5"));
        assert_eq!(found.total, None);
    }

    #[test]
    fn test_fm_legacy_has_no_count() {
        let found = rating_of(r#"<div class="FM_str"><span class="FM_bo">2.8</span></div>"#);
        assert_eq!(rating_str(&found), Some("2.8"));
        assert_eq!(found.total, None);
    }

    #[test]
    fn test_testimonial() {
        let found = rating_of(r#"<span class="first-span">5.0</span>"#);
        assert_eq!(rating_str(&found), Some("5.0"));
    }

    #[test]
    fn test_present_layout_with_bad_value_stops_chain() {
        // The gradient block is present but unreadable; the older testimonial is not consulted
        let found = rating_of(
            r#"<p class="rtng-get"><span class="fwb">New</span></p><span class="first-span">4.0</span>"#,
        );
        assert_eq!(found.rating, None);
    }

    #[test]
    fn test_newest_layout_wins() {
        let found = rating_of(
            r#"<div class="FM_s"><div class="FM_str"><span class="FM_bo">4.6</span></div></div>
            <p class="rtng-get"><span class="fwb">3.1</span></p>"#,
        );
        assert_eq!(rating_str(&found), Some("4.6"));
    }

    #[test]
    fn test_no_layout() {
        assert_eq!(rating_of("<p>4.5</p>"), OverallRating::default());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("(1,204 ratings)"), Some(1204));
        assert_eq!(parse_count("no ratings"), None);
    }
}
