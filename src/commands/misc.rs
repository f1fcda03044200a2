//! Miscellaneous commands: match, doctor, config

use colored::Colorize;
use std::collections::BTreeSet;

use ratescout::config::Config;
use ratescout::error::Result;
use ratescout::matcher::match_report;
use ratescout::ollama::OllamaClient;

fn join_tokens(tokens: &BTreeSet<String>) -> String {
    if tokens.is_empty() {
        "(none)".to_string()
    } else {
        tokens.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Compare two company names and explain the decision
pub fn cmd_match(input: &str, candidate: &str, json: bool) -> Result<()> {
    let report = match_report(input, candidate);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n  Input tokens:     {}", join_tokens(&report.input_tokens));
    println!("  Candidate tokens: {}", join_tokens(&report.candidate_tokens));
    println!("  Shared:           {}", join_tokens(&report.overlap));
    println!("  Input is subset:  {}", report.is_subset);
    if report.matched {
        println!("\n  {}\n", "MATCH".green().bold());
    } else {
        println!("\n  {}\n", "NO MATCH".red().bold());
    }
    Ok(())
}

/// Check configuration, Ollama and the configured model
pub fn cmd_doctor() -> Result<()> {
    println!("\nratescout doctor\n");

    println!("  ratescout binary: v{}", env!("CARGO_PKG_VERSION"));

    match Config::config_path() {
        Ok(path) if path.exists() => println!("  Config: {}", path.display()),
        Ok(path) => println!("  Config: {} (not present, using defaults)", path.display()),
        Err(e) => println!("  Config: ERROR - {}", e),
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            println!("  Config: INVALID - {}", e);
            println!();
            return Ok(());
        }
    };

    let client = OllamaClient::new(&config.llm);
    match client.list_models() {
        Ok(models) => {
            println!("  Ollama: reachable at {} ({} models)", config.llm.host, models.len());
            if models.iter().any(|m| m == &config.llm.model) {
                println!("  Model: {} (installed)", config.llm.model);
            } else {
                println!("  Model: {} {}", config.llm.model, "NOT INSTALLED".red());
                println!("    Run: ollama pull {}", config.llm.model);
            }
        }
        Err(e) => println!("  Ollama: {} at {} - {}", "NOT REACHABLE".red(), config.llm.host, e),
    }

    println!("  Model budget: {}s per call", config.llm.timeout_secs);
    println!();
    Ok(())
}

/// Print the effective configuration, optionally writing the defaults
pub fn cmd_config(init: bool) -> Result<()> {
    let path = Config::config_path()?;

    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            Config::default().save()?;
            println!("Wrote default config to {}", path.display());
        }
        return Ok(());
    }

    let config = Config::load()?;
    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}
