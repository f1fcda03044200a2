//! Extraction record types
//!
//! Every field of a record is either a validated value or unresolved. An
//! unresolved field is `None` in Rust and the literal `"N/A"` everywhere it
//! leaves the process (JSON, reports, prompts).

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sentinel for a field that exists in the schema but could not be resolved
pub const NA: &str = "N/A";

// A rating is a float in [1, 4.x] or exactly 5 / 5.0
static RATING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([1-4](?:\.\d+)?|5(?:\.0)?)\b").expect("Invalid rating regex")
});

/// Overall supplier rating, always within [1.0, 5.0]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rating(String);

impl Rating {
    /// Find the first acceptable rating inside free text.
    ///
    /// Anything that is not a float in [1, 5) or exactly 5 / 5.0 is ignored.
    pub fn parse(text: &str) -> Option<Rating> {
        RATING_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| Rating(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> f64 {
        // The regex only admits well-formed decimals
        self.0.parse().unwrap_or(0.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Rating::parse(s).ok_or_else(|| format!("not a rating: {}", s))
    }
}

impl Serialize for Rating {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Whole-star review score, always 1 through 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stars(u8);

impl Stars {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Build from an integer, rejecting anything outside 1..=5
    pub fn new(stars: u8) -> Option<Stars> {
        (Self::MIN..=Self::MAX).contains(&stars).then_some(Stars(stars))
    }

    /// Convert a fill percentage of a five-star bar into whole stars.
    ///
    /// `round(percent / 20)` with ties to even, clamped to 1..=5 so that a
    /// nearly empty bar still reads as one star.
    pub fn from_percent(percent: f64) -> Stars {
        let raw = (percent / 20.0).round_ties_even();
        let clamped = raw.clamp(f64::from(Self::MIN), f64::from(Self::MAX));
        Stars(clamped as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Stars {
    type Err = String;

    /// Accepts "4" or an integral float such as "4.0"; fractions are rejected
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| format!("not a star count: {}", s))?;
        if value.fract() != 0.0 {
            return Err(format!("fractional stars: {}", s));
        }
        if !(f64::from(Self::MIN)..=f64::from(Self::MAX)).contains(&value) {
            return Err(format!("stars out of range: {}", s));
        }
        Ok(Stars(value as u8))
    }
}

impl Serialize for Stars {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Which satisfaction metric a label refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Response,
    Quality,
    Delivery,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Response, MetricKind::Quality, MetricKind::Delivery];

    /// Classify a label by case-insensitive substring, response first
    pub fn classify(label: &str) -> Option<MetricKind> {
        let label = label.to_lowercase();
        if label.contains("response") {
            Some(MetricKind::Response)
        } else if label.contains("quality") {
            Some(MetricKind::Quality)
        } else if label.contains("delivery") {
            Some(MetricKind::Delivery)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Response => "Response",
            MetricKind::Quality => "Quality",
            MetricKind::Delivery => "Delivery",
        }
    }
}

/// User satisfaction percentages shown on a supplier page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(with = "na", default)]
    pub response: Option<String>,
    #[serde(with = "na", default)]
    pub quality: Option<String>,
    #[serde(with = "na", default)]
    pub delivery: Option<String>,
}

impl Metrics {
    pub fn get(&self, kind: MetricKind) -> Option<&str> {
        match kind {
            MetricKind::Response => self.response.as_deref(),
            MetricKind::Quality => self.quality.as_deref(),
            MetricKind::Delivery => self.delivery.as_deref(),
        }
    }

    pub fn set(&mut self, kind: MetricKind, value: String) {
        let slot = match kind {
            MetricKind::Response => &mut self.response,
            MetricKind::Quality => &mut self.quality,
            MetricKind::Delivery => &mut self.delivery,
        };
        *slot = Some(value);
    }

    pub fn is_complete(&self) -> bool {
        MetricKind::ALL.iter().all(|k| self.get(*k).is_some())
    }

    pub fn is_empty(&self) -> bool {
        MetricKind::ALL.iter().all(|k| self.get(*k).is_none())
    }
}

/// A single buyer review, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    #[serde(with = "na", default)]
    pub name: Option<String>,
    #[serde(with = "na", default)]
    pub stars: Option<Stars>,
    #[serde(with = "na", default)]
    pub text: Option<String>,
    /// Only the model fallback ever fills this
    #[serde(with = "na", default)]
    pub product: Option<String>,
}

/// Everything extracted from one supplier page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(with = "na", default)]
    pub rating: Option<Rating>,
    #[serde(with = "na", default)]
    pub total_ratings: Option<u64>,
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl ExtractionRecord {
    /// Incomplete enough that the model fallback is worth a try
    pub fn needs_fallback(&self) -> bool {
        !self.metrics.is_complete() || self.reviews.is_empty()
    }

    /// Nothing at all was resolved (still reported, to surface markup drift)
    pub fn is_blank(&self) -> bool {
        self.rating.is_none()
            && self.total_ratings.is_none()
            && self.metrics.is_empty()
            && self.reviews.is_empty()
    }
}

/// Render an optional field, substituting the sentinel
pub fn or_na<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NA.to_string(),
    }
}

/// Serde adapter: `None` <-> `"N/A"`
pub(crate) mod na {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::NA;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
        Float(f64),
    }

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(NA),
        }
    }

    /// Lenient: "N/A", empty, null and unparseable values all become `None`
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let raw: Option<Raw> = Option::deserialize(deserializer)?;
        let text = match raw {
            Some(Raw::Text(s)) => s,
            Some(Raw::Int(n)) => n.to_string(),
            Some(Raw::Float(f)) => f.to_string(),
            None => return Ok(None),
        };
        Ok(parse_field(&text))
    }

    pub(crate) fn parse_field<T: FromStr>(text: &str) -> Option<T> {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case(NA) {
            return None;
        }
        text.parse().ok()
    }
}
