use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::extract::MetricPrecedence;

#[derive(Parser)]
#[command(name = "ratescout")]
#[command(author, version, about = "Extract supplier ratings and reviews from saved marketplace pages", long_about = None)]
#[command(after_help = r#"Examples:
  ratescout extract "ABC Cement" page.html                 Extract one saved page
  ratescout extract "ABC Cement" a.html b.html --json      JSON lines output
  ratescout extract "ABC Cement" page.html --llm           Fill gaps with the local model
  ratescout batch pages.tsv --output results.txt           company<TAB>path per line
  ratescout match "ABC Cement Pvt Ltd" "ABC Cement Industries"
  ratescout doctor                                         Check Ollama and the model
"#)]
pub struct Cli {
    /// More log output (-v for debug, -vv for trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract ratings from saved pages of one company
    Extract {
        /// Company name as searched for
        company: String,

        /// Saved HTML pages
        #[arg(required = true, value_name = "HTML_FILE")]
        pages: Vec<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract from a list of `company<TAB>path` lines
    Batch {
        /// List file; relative page paths resolve against its directory
        list: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show how two company names compare
    Match {
        /// Name as searched for
        input: String,

        /// Name shown on the page
        candidate: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check Ollama connectivity and model availability
    Doctor,

    /// Show the effective configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Fill incomplete records with the local model
    #[arg(long)]
    pub llm: bool,

    /// Model time budget in seconds (overrides config)
    #[arg(long, value_name = "SECS", requires = "llm")]
    pub timeout: Option<f64>,

    /// Which satisfaction layout wins for the same metric (overrides config)
    #[arg(long, value_enum)]
    pub precedence: Option<PrecedenceArg>,

    /// Write JSON lines instead of the text report
    #[arg(long)]
    pub json: bool,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PrecedenceArg {
    LastWins,
    FirstWins,
}

impl From<PrecedenceArg> for MetricPrecedence {
    fn from(arg: PrecedenceArg) -> Self {
        match arg {
            PrecedenceArg::LastWins => MetricPrecedence::LastWins,
            PrecedenceArg::FirstWins => MetricPrecedence::FirstWins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_args() {
        let cli = Cli::parse_from([
            "ratescout", "extract", "ABC Cement", "a.html", "b.html", "--llm", "--timeout", "1.5",
        ]);
        match cli.command {
            Commands::Extract { company, pages, output } => {
                assert_eq!(company, "ABC Cement");
                assert_eq!(pages.len(), 2);
                assert!(output.llm);
                assert_eq!(output.timeout, Some(1.5));
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_timeout_requires_llm() {
        let result = Cli::try_parse_from(["ratescout", "extract", "ABC", "a.html", "--timeout", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_precedence_flag() {
        let cli = Cli::parse_from(["ratescout", "-v", "batch", "list.tsv", "--precedence", "first-wins"]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Batch { output, .. } => {
                let p: MetricPrecedence = output.precedence.unwrap().into();
                assert_eq!(p, MetricPrecedence::FirstWins);
            }
            _ => panic!("expected batch"),
        }
    }
}
