//! Extraction commands: extract, batch

use colored::Colorize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use ratescout::batch::{parse_batch_list, BatchEntry};
use ratescout::cli::OutputArgs;
use ratescout::config::Config;
use ratescout::error::{RatescoutError, Result};
use ratescout::llm::LlmNormalizer;
use ratescout::pipeline::{process_page, PageOutcome};
use ratescout::report::{write_report, ReportFormat};

/// Extract every given page for one company
pub fn cmd_extract(company: String, pages: Vec<PathBuf>, output: &OutputArgs) -> Result<()> {
    let entries = pages
        .into_iter()
        .map(|page| BatchEntry {
            company: company.clone(),
            page,
        })
        .collect();
    run_entries(entries, output)
}

/// Extract every page listed in a batch file
pub fn cmd_batch(list: &Path, output: &OutputArgs) -> Result<()> {
    let content = std::fs::read_to_string(list)?;
    let base_dir = list.parent().unwrap_or_else(|| Path::new("."));
    let entries = parse_batch_list(&content, base_dir)?;
    run_entries(entries, output)
}

fn run_entries(entries: Vec<BatchEntry>, args: &OutputArgs) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(secs) = args.timeout {
        config.llm.timeout_secs = secs;
        config.llm.validate()?;
    }
    if let Some(precedence) = args.precedence {
        config.extract.metric_precedence = precedence.into();
    }

    // Resolve the model once, up front; a missing model stops the run here
    let llm = if args.llm {
        Some(LlmNormalizer::connect(&config.llm)?)
    } else {
        None
    };

    let format = if args.json {
        ReportFormat::JsonLines
    } else {
        ReportFormat::Text
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    let mut reported = 0usize;
    let mut skipped = 0usize;
    let mut unreadable = 0usize;

    for entry in entries {
        let html = match std::fs::read_to_string(&entry.page) {
            Ok(html) => html,
            Err(source) => {
                let err = RatescoutError::PageReadError {
                    path: entry.page.display().to_string(),
                    source,
                };
                warn!(error = %err, "skipping unreadable page");
                eprintln!("  {} {}", "[ERROR]".red(), err);
                unreadable += 1;
                continue;
            }
        };

        match process_page(&entry.company, &html, &config.extract, llm.as_ref()) {
            PageOutcome::Extracted(report) => {
                write_report(&mut out, &report, format)?;
                reported += 1;
            }
            PageOutcome::Skipped { matched_name } => {
                eprintln!(
                    "  {} {}: page belongs to {}",
                    "[SKIP]".yellow(),
                    entry.company,
                    matched_name.as_deref().unwrap_or("an unknown company")
                );
                skipped += 1;
            }
        }
    }

    out.flush()?;

    eprintln!(
        "\n{} reported, {} skipped (name mismatch), {} unreadable",
        reported.to_string().green(),
        skipped,
        unreadable
    );
    if let Some(path) = &args.output {
        eprintln!("Written to {}", path.display());
    }

    Ok(())
}
