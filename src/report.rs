//! Flat output for extracted pages

use std::io::{self, Write};

use crate::pipeline::PageReport;
use crate::record::{or_na, MetricKind, NA};

const RULE_WIDTH: usize = 60;

/// Output format for page reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable blocks separated by a rule
    Text,
    /// One JSON object per line
    JsonLines,
}

/// Write one page report in the given format
pub fn write_report<W: Write>(out: &mut W, report: &PageReport, format: ReportFormat) -> io::Result<()> {
    match format {
        ReportFormat::Text => write_text(out, report),
        ReportFormat::JsonLines => {
            serde_json::to_writer(&mut *out, report)?;
            writeln!(out)
        }
    }
}

fn write_text<W: Write>(out: &mut W, report: &PageReport) -> io::Result<()> {
    let record = &report.record;

    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Input Company   : {}", report.input_name)?;
    writeln!(out, "Matched Company : {}", report.matched_name)?;
    writeln!(out)?;
    writeln!(out, "Overall Rating  : {} / 5", or_na(&record.rating))?;
    writeln!(out, "Total Ratings   : {}", or_na(&record.total_ratings))?;
    writeln!(out)?;

    for kind in MetricKind::ALL {
        writeln!(
            out,
            "{:<9}: {}",
            kind.label(),
            record.metrics.get(kind).unwrap_or(NA)
        )?;
    }
    writeln!(out)?;

    for review in &record.reviews {
        writeln!(
            out,
            "- {} | {} | {}",
            or_na(&review.name),
            or_na(&review.stars),
            or_na(&review.text)
        )?;
    }

    if report.used_fallback {
        writeln!(out, "(gaps filled by model)")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ExtractionRecord, Rating, Review, Stars};

    fn sample() -> PageReport {
        let mut record = ExtractionRecord {
            rating: Rating::parse("4.3"),
            total_ratings: Some(57),
            ..ExtractionRecord::default()
        };
        record.metrics.set(MetricKind::Response, "88%".into());
        record.reviews.push(Review {
            name: Some("Ravi".into()),
            stars: Stars::new(4),
            text: None,
            product: None,
        });
        PageReport {
            input_name: "ABC Cement".into(),
            matched_name: "ABC Cement Pvt Ltd".into(),
            record,
            used_fallback: false,
        }
    }

    fn render(format: ReportFormat) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, &sample(), format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_report() {
        let text = render(ReportFormat::Text);
        assert!(text.contains(&"=".repeat(60)));
        assert!(text.contains("Input Company   : ABC Cement\n"));
        assert!(text.contains("Matched Company : ABC Cement Pvt Ltd\n"));
        assert!(text.contains("Overall Rating  : 4.3 / 5\n"));
        assert!(text.contains("Total Ratings   : 57\n"));
        assert!(text.contains("Response : 88%\n"));
        assert!(text.contains("Quality  : N/A\n"));
        assert!(text.contains("Delivery : N/A\n"));
        assert!(text.contains("- Ravi | 4 | N/A\n"));
        assert!(!text.contains("gaps filled"));
    }

    #[test]
    fn test_json_lines_report() {
        let line = render(ReportFormat::JsonLines);
        assert!(line.ends_with('\n'));
        let parsed: PageReport = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(parsed, sample());
    }
}
