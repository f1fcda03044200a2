use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use super::{selector, text_of, Page};
use crate::record::{Review, Stars};

static WIDTH_PERCENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)%").expect("Invalid width regex")
});

static CLASSIC_CARD: Lazy<Selector> = Lazy::new(|| selector("div.revw-user"));
static CLASSIC_NAME: Lazy<Selector> = Lazy::new(|| selector(".revw-nme"));
static CLASSIC_STARS: Lazy<Selector> = Lazy::new(|| selector(".star-clr"));
static CLASSIC_TEXT: Lazy<Selector> = Lazy::new(|| selector(".revw-comntmr11"));

static FM_CARD: Lazy<Selector> = Lazy::new(|| selector("div.FM_rvwC"));
static FM_NAME: Lazy<Selector> = Lazy::new(|| selector("span"));
static FM_STARS: Lazy<Selector> = Lazy::new(|| selector(".FM_flsRt"));

/// Map a star bar's inline style (e.g. `width:80%`) to whole stars
pub fn css_width_to_stars(style: &str) -> Option<Stars> {
    let caps = WIDTH_PERCENT_RE.captures(style)?;
    let percent: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(Stars::from_percent(percent))
}

/// Review card layouts. Both are scanned and their reviews concatenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewLayout {
    /// `div.revw-user` cards with name, star bar and comment
    Classic,
    /// `div.FM_rvwC` cards; these never carry the comment text
    Fm,
}

impl ReviewLayout {
    pub const SCAN_ORDER: [ReviewLayout; 2] = [ReviewLayout::Classic, ReviewLayout::Fm];

    pub fn reviews(self, page: &Page) -> Vec<Review> {
        match self {
            ReviewLayout::Classic => page
                .document()
                .select(&CLASSIC_CARD)
                .map(|card| Review {
                    name: non_empty_text(card, &CLASSIC_NAME),
                    stars: stars_of(card, &CLASSIC_STARS),
                    text: non_empty_text(card, &CLASSIC_TEXT),
                    product: None,
                })
                .collect(),
            ReviewLayout::Fm => page
                .document()
                .select(&FM_CARD)
                .map(|card| Review {
                    name: non_empty_text(card, &FM_NAME),
                    stars: stars_of(card, &FM_STARS),
                    text: None,
                    product: None,
                })
                .collect(),
        }
    }
}

fn non_empty_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(text_of)
        .filter(|text| !text.is_empty())
}

fn stars_of(card: ElementRef<'_>, selector: &Selector) -> Option<Stars> {
    card.select(selector)
        .next()
        .and_then(|bar| bar.value().attr("style"))
        .and_then(css_width_to_stars)
}

/// All reviews on the page, classic cards first, each in document order
pub fn extract_reviews(page: &Page) -> Vec<Review> {
    ReviewLayout::SCAN_ORDER
        .iter()
        .flat_map(|layout| layout.reviews(page))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stars(style: &str) -> Option<u8> {
        css_width_to_stars(style).map(Stars::get)
    }

    #[test]
    fn test_css_width_to_stars() {
        assert_eq!(stars("width:100%"), Some(5));
        assert_eq!(stars("width: 80%;"), Some(4));
        assert_eq!(stars("color:red;width:40%"), Some(2));
        assert_eq!(stars("width:93.5%"), Some(5));
    }

    #[test]
    fn test_css_width_zero_clamps_to_one() {
        assert_eq!(stars("width:0%"), Some(1));
    }

    #[test]
    fn test_css_width_without_percent() {
        assert_eq!(stars("width:80px"), None);
        assert_eq!(stars(""), None);
    }

    #[test]
    fn test_classic_cards() {
        let page = Page::parse(
            r#"<div class="revw-user">
                <span class="revw-nme">Suresh Kumar</span>
                <div class="star-clr" style="width:60%"></div>
                <p class="revw-comntmr11">Timely delivery, good packing</p>
            </div>
            <div class="revw-user"><span class="revw-nme">Anita</span></div>"#,
        );
        let reviews = extract_reviews(&page);
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].name.as_deref(), Some("Suresh Kumar"));
        assert_eq!(reviews[0].stars.map(Stars::get), Some(3));
        assert_eq!(reviews[0].text.as_deref(), Some("Timely delivery, good packing"));
        assert_eq!(reviews[1].stars, None);
        assert_eq!(reviews[1].text, None);
    }

    #[test]
    fn test_star_bar_without_style() {
        let page = Page::parse(
            r#"<div class="revw-user"><span class="revw-nme">Anita</span><div class="star-clr"></div></div>"#,
        );
        assert_eq!(extract_reviews(&page)[0].stars, None);
    }

    #[test]
    fn test_fm_cards_have_no_text() {
        let page = Page::parse(
            r#"<div class="FM_rvwC"><span>Rohit</span><div class="FM_flsRt" style="width:100%"></div></div>
            <div class="FM_rvwC"><div class="FM_flsRt" style="width:20%"></div></div>"#,
        );
        let reviews = extract_reviews(&page);
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].name.as_deref(), Some("Rohit"));
        assert_eq!(reviews[0].stars.map(Stars::get), Some(5));
        assert_eq!(reviews[0].text, None);
        assert_eq!(reviews[1].name, None);
        assert_eq!(reviews[1].stars.map(Stars::get), Some(1));
    }

    #[test]
    fn test_layouts_concatenate_classic_first() {
        let page = Page::parse(
            r#"<div class="FM_rvwC"><span>Second</span></div>
            <div class="revw-user"><span class="revw-nme">First</span></div>"#,
        );
        let names: Vec<_> = extract_reviews(&page)
            .into_iter()
            .map(|r| r.name.unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_no_reviews() {
        assert!(extract_reviews(&Page::parse("<p>No reviews yet</p>")).is_empty());
    }
}
