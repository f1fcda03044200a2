use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use super::{selector, text_of, Page};
use crate::record::{MetricKind, Metrics};

static TILE: Lazy<Selector> = Lazy::new(|| selector("div.mSR_w33"));
static TILE_LABEL: Lazy<Selector> = Lazy::new(|| selector("p"));
static TILE_VALUE: Lazy<Selector> = Lazy::new(|| selector("span"));

static BAR_ROW: Lazy<Selector> = Lazy::new(|| selector("p.FM_ds7"));
static BAR_LABEL: Lazy<Selector> = Lazy::new(|| selector(".FM_pbarS"));
static BAR_VALUE: Lazy<Selector> = Lazy::new(|| selector("span"));

static GRAPH_ITEM: Lazy<Selector> = Lazy::new(|| selector("li.grph-item"));
static GRAPH_LABEL: Lazy<Selector> = Lazy::new(|| selector(".stfn-area"));
static GRAPH_VALUE: Lazy<Selector> = Lazy::new(|| selector(".grph-count"));

/// What happens when two layouts report the same metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricPrecedence {
    /// Later layouts in scan order overwrite earlier ones, per metric
    #[default]
    LastWins,
    /// The first layout to report a metric keeps it
    FirstWins,
}

/// Satisfaction blocks seen on supplier pages, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatisfactionLayout {
    /// `div.mSR_w33` tiles: label in `p`, value in `span`
    Tiles,
    /// `p.FM_ds7` progress bars: label in `.FM_pbarS`, value in the first `%` span
    ProgressBars,
    /// `li.grph-item` graph rows: `.stfn-area` / `.grph-count`
    Graph,
}

impl SatisfactionLayout {
    pub const SCAN_ORDER: [SatisfactionLayout; 3] = [
        SatisfactionLayout::Tiles,
        SatisfactionLayout::ProgressBars,
        SatisfactionLayout::Graph,
    ];

    /// Every (metric, value) pair this layout carries, in document order
    pub fn entries(self, page: &Page) -> Vec<(MetricKind, String)> {
        let (block_sel, label_sel): (&Selector, &Selector) = match self {
            SatisfactionLayout::Tiles => (&*TILE, &*TILE_LABEL),
            SatisfactionLayout::ProgressBars => (&*BAR_ROW, &*BAR_LABEL),
            SatisfactionLayout::Graph => (&*GRAPH_ITEM, &*GRAPH_LABEL),
        };

        page.document()
            .select(block_sel)
            .filter_map(|block| {
                let label = first_text(block, label_sel)?;
                let value = match self {
                    SatisfactionLayout::Tiles => first_text(block, &TILE_VALUE),
                    SatisfactionLayout::ProgressBars => percent_span(block),
                    SatisfactionLayout::Graph => first_text(block, &GRAPH_VALUE),
                }
                .filter(|value| !value.is_empty())?;
                MetricKind::classify(&label).map(|kind| (kind, value))
            })
            .collect()
    }
}

fn first_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    block.select(selector).next().map(text_of)
}

fn percent_span(block: ElementRef<'_>) -> Option<String> {
    block
        .select(&BAR_VALUE)
        .map(text_of)
        .find(|text| text.contains('%'))
}

/// Response, quality and delivery percentages, last layout wins per metric
pub fn extract_user_satisfaction(page: &Page) -> Metrics {
    extract_user_satisfaction_with(page, MetricPrecedence::LastWins)
}

/// Scan every satisfaction layout and merge per metric
pub fn extract_user_satisfaction_with(page: &Page, precedence: MetricPrecedence) -> Metrics {
    let mut metrics = Metrics::default();
    for layout in SatisfactionLayout::SCAN_ORDER {
        for (kind, value) in layout.entries(page) {
            if precedence == MetricPrecedence::FirstWins && metrics.get(kind).is_some() {
                continue;
            }
            metrics.set(kind, value);
        }
    }
    metrics
}
