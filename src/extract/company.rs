use once_cell::sync::Lazy;
use scraper::Selector;

use super::{selector, text_of, Page};

static SUPPLIER_LINK: Lazy<Selector> = Lazy::new(|| selector("div.supplierInfoDiv a.cardlinks"));

// Heading fallbacks, most specific first
static HEADINGS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["h1.FM_h1", "div.FM_ttl", "h1"]
        .into_iter()
        .map(selector)
        .collect()
});

/// Headings this short are usually icons or stray labels
const MIN_HEADING_CHARS: usize = 3;

/// Name of the supplier the page belongs to.
///
/// A supplier card link decides on its own, even when it is empty; headings
/// are only consulted on pages without one.
pub fn extract_company_name(page: &Page) -> Option<String> {
    if let Some(link) = page.select_one(&SUPPLIER_LINK) {
        return Some(text_of(link)).filter(|name| !name.is_empty());
    }

    HEADINGS.iter().find_map(|heading| {
        page.select_one(heading)
            .map(text_of)
            .filter(|text| text.chars().count() > MIN_HEADING_CHARS)
    })
}
