//! Batch list files: one `company<TAB>path` pair per line

use std::path::{Path, PathBuf};

use crate::error::{RatescoutError, Result};

/// One page to process for one company
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub company: String,
    pub page: PathBuf,
}

/// Parse a batch list. Blank lines and `#` comments are skipped; relative
/// page paths are resolved against `base_dir`.
pub fn parse_batch_list(content: &str, base_dir: &Path) -> Result<Vec<BatchEntry>> {
    let mut entries = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (company, page) = line.split_once('\t').ok_or_else(|| RatescoutError::BatchLineError {
            line: index + 1,
            reason: "expected a tab between company and page path".into(),
        })?;

        let company = company.trim();
        let page = page.trim();
        if company.is_empty() || page.is_empty() {
            return Err(RatescoutError::BatchLineError {
                line: index + 1,
                reason: "company and page path must both be present".into(),
            });
        }

        let page = Path::new(page);
        let page = if page.is_absolute() {
            page.to_path_buf()
        } else {
            base_dir.join(page)
        };

        entries.push(BatchEntry {
            company: company.to_string(),
            page,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_list() {
        let content = "# cement suppliers\nABC Cement\tpages/abc.html\n\n  Ramco Cements\t/tmp/ramco.html  \n";
        let entries = parse_batch_list(content, Path::new("/data")).unwrap();
        assert_eq!(
            entries,
            vec![
                BatchEntry {
                    company: "ABC Cement".into(),
                    page: PathBuf::from("/data/pages/abc.html"),
                },
                BatchEntry {
                    company: "Ramco Cements".into(),
                    page: PathBuf::from("/tmp/ramco.html"),
                },
            ]
        );
    }

    #[test]
    fn test_missing_tab_reports_line() {
        let err = parse_batch_list("ok\ta.html\nno tab here\n", Path::new(".")).unwrap_err();
        match err {
            RatescoutError::BatchLineError { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_company_rejected() {
        assert!(parse_batch_list("\ta.html", Path::new(".")).is_err());
    }
}
