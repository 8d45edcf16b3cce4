//! Pageaudit CLI - Web Page Audit Rule Engine
//!
//! Audits crawled page snapshots and reports per-page and per-category scores.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use glob::glob;
use pageaudit::audit::Auditor;
use pageaudit::config::{Config, OutputFormat};
use pageaudit::output::{JsonFormatter, OutputFormatter, TextFormatter};
use pageaudit::page::PageContext;
use pageaudit::registry::RuleRegistry;
use pageaudit::rule::RuleDef;
use pageaudit::rules::builtin_rules;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "pageaudit",
    version,
    about = "Web page audit rule engine",
    long_about = "Audits crawled page snapshots (.html files or .json crawl records) \
                  against SEO, content, security, and accessibility rules."
)]
struct Cli {
    /// Snapshot files or glob patterns to audit
    files: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value = "0")]
    jobs: usize,

    /// Disable specific rules or categories (comma-separated patterns)
    #[arg(long, value_delimiter = ',')]
    disable: Option<Vec<String>>,

    /// Only enable specific rules or categories (comma-separated patterns)
    #[arg(long, value_delimiter = ',')]
    enable: Option<Vec<String>>,

    /// Show passing rules, not only warnings and failures
    #[arg(long)]
    show_passes: bool,

    /// Show session statistics
    #[arg(long)]
    stats: bool,

    /// Show per-rule timing statistics
    #[arg(long)]
    timing: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show detailed information about a rule
    Explain {
        /// Rule ID to explain
        rule_id: String,
    },
    /// Initialize a configuration file
    Init {
        /// Preset to use (recommended, strict, minimal)
        #[arg(long, default_value = "recommended")]
        preset: String,

        /// Output format (yaml, json)
        #[arg(long, default_value = "yaml")]
        output_format: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// JSON crawl record, one page per file
#[derive(Deserialize)]
struct PageSnapshot {
    url: String,
    html: String,
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    headers: HashMap<String, String>,
    #[serde(default)]
    response_time_ms: Option<u64>,
}

/// Helper function to print a rule in a consistent format
fn print_rule(rule: &RuleDef) {
    let kind = if rule.is_stateful() {
        " [stateful]".yellow()
    } else {
        "".normal()
    };
    println!(
        "    {} ({}) weight {}{}",
        rule.id.cyan(),
        rule.category,
        rule.weight,
        kind
    );
    println!("      {}", rule.description);
}

/// Print detailed rule explanation
fn explain_rule(rule: &RuleDef) {
    println!("{}", "Rule Details".bold());
    println!();
    println!("  {}: {}", "ID".bold(), rule.id.cyan());
    println!("  {}: {}", "Name".bold(), rule.name);
    println!("  {}: {}", "Category".bold(), rule.category);
    println!("  {}: {}", "Weight".bold(), rule.weight);
    println!(
        "  {}: {}",
        "Kind".bold(),
        if rule.is_stateful() {
            "stateful (cross-page)"
        } else {
            "stateless (per-page)"
        }
    );
    if let Some(timeout) = rule.timeout {
        println!("  {}: {:?}", "Timeout".bold(), timeout);
    }
    println!();
    println!("  {}", "Description".bold());
    println!("  {}", rule.description);
}

/// Handle the explain subcommand
fn handle_explain(rule_id: &str) {
    match builtin_rules().iter().find(|r| r.id == rule_id) {
        Some(rule) => explain_rule(rule),
        None => {
            eprintln!("{}: Rule '{}' not found", "error".red().bold(), rule_id);
            eprintln!();
            eprintln!("Use {} to see all available rules", "--list-rules".cyan());
            std::process::exit(1);
        }
    }
}

/// Handle the init subcommand
fn handle_init(preset: &str, output_format: &str) {
    let config = match Config::preset(preset) {
        Some(c) => c,
        None => {
            eprintln!(
                "{}: Unknown preset '{}'. Available: recommended, strict, minimal",
                "error".red().bold(),
                preset
            );
            std::process::exit(1);
        }
    };

    let filename = if output_format == "json" {
        ".pageauditrc.json"
    } else {
        ".pageauditrc.yaml"
    };

    if Path::new(filename).exists() {
        eprintln!(
            "{}: {} already exists. Remove it first to reinitialize.",
            "error".red().bold(),
            filename
        );
        std::process::exit(1);
    }

    let content = if output_format == "json" {
        serde_json::to_string_pretty(&config).unwrap_or_default()
    } else {
        format!(
            "# Pageaudit configuration\n# Generated with: pageaudit init\n\n{}",
            serde_yaml::to_string(&config).unwrap_or_default()
        )
    };

    if let Err(e) = std::fs::write(filename, content) {
        eprintln!(
            "{}: Failed to write {}: {}",
            "error".red().bold(),
            filename,
            e
        );
        std::process::exit(1);
    }

    println!("{} Created {}", "success".green().bold(), filename);
    println!();
    println!("Next steps:");
    println!("  1. Review and customize the configuration");
    println!(
        "  2. Run {} to audit your crawl snapshots",
        "pageaudit crawl/**/*.html".cyan()
    );
}

/// Load one snapshot file into a page context
fn load_page(path: &Path) -> Result<PageContext, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        let snapshot: PageSnapshot = serde_json::from_str(&raw)
            .map_err(|e| format!("invalid crawl record {}: {}", path.display(), e))?;
        let mut page = PageContext::from_static_html(&snapshot.url, &snapshot.html)
            .with_headers(snapshot.headers);
        if let Some(status) = snapshot.status {
            page = page.with_status(status);
        }
        if let Some(ms) = snapshot.response_time_ms {
            page = page.with_response_time(Duration::from_millis(ms));
        }
        Ok(page)
    } else {
        // Plain .html snapshots carry no crawl metadata, so the file
        // path stands in for the URL.
        let url = format!("file://{}", path.display());
        Ok(PageContext::from_static_html(&url, &raw))
    }
}

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Handle --no-color
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Handle subcommands
    if let Some(cmd) = &cli.command {
        match cmd {
            Commands::Explain { rule_id } => {
                handle_explain(rule_id);
                return;
            }
            Commands::Init {
                preset,
                output_format,
            } => {
                handle_init(preset, output_format);
                return;
            }
        }
    }

    // Handle --list-rules
    if cli.list_rules {
        let rules = builtin_rules();
        println!("{}", "Available rules:".bold());
        println!();
        let mut current_category = "";
        for rule in &rules {
            if rule.category != current_category {
                current_category = &rule.category;
                println!("  {}:", current_category.cyan());
            }
            print_rule(rule);
        }
        println!();
        println!("{} rules total", rules.len());
        return;
    }

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::load(config_path).unwrap_or_else(|e| {
            eprintln!("{}: Failed to load config: {}", "error".red().bold(), e);
            std::process::exit(1);
        })
    } else {
        Config::load_default().unwrap_or_default()
    };

    // Merge CLI arguments
    let format = match cli.format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
    };
    config.merge_cli(
        Some(format),
        Some(cli.verbose),
        Some(cli.jobs),
        cli.disable.clone(),
        cli.enable.clone(),
    );

    if cli.files.is_empty() {
        eprintln!("{}: No files specified", "error".red().bold());
        eprintln!();
        eprintln!("Usage: pageaudit [OPTIONS] <FILES>...");
        eprintln!();
        eprintln!("For more information, try '--help'");
        std::process::exit(2);
    }

    // Expand glob patterns
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in &cli.files {
        match glob(pattern) {
            Ok(paths) => {
                for entry in paths.flatten() {
                    if entry.is_file() {
                        files.push(entry);
                    }
                }
            }
            Err(e) => {
                eprintln!(
                    "{}: Invalid pattern '{}': {}",
                    "error".red().bold(),
                    pattern,
                    e
                );
                std::process::exit(1);
            }
        }
    }

    if files.is_empty() {
        eprintln!("{}: No files found to audit", "error".red().bold());
        std::process::exit(1);
    }

    // Load pages in crawl order (file order on the command line)
    let mut pages: Vec<PageContext> = Vec::new();
    for path in &files {
        match load_page(path) {
            Ok(page) => pages.push(page),
            Err(e) => {
                eprintln!("{}: {}", "warning".yellow(), e);
            }
        }
    }

    if pages.is_empty() {
        eprintln!("{}: No pages could be loaded", "error".red().bold());
        std::process::exit(1);
    }

    if cli.verbose {
        eprintln!("Auditing {} pages...", pages.len());
    }

    // Build the registry and run the session
    let registry = match RuleRegistry::from_rules(builtin_rules()) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    };

    let auditor = Auditor::new(config.clone(), registry);
    let mut result = auditor.audit_session(&pages);

    if !cli.stats {
        result.stats = None;
    }

    // Format output
    let formatter: Box<dyn OutputFormatter> = match config.output.format {
        OutputFormat::Json => Box::new(JsonFormatter::new().pretty()),
        OutputFormat::Text => {
            let mut text = TextFormatter::new();
            text.show_stats = config.output.statistics;
            if cli.no_color {
                text = text.without_color();
            }
            if cli.show_passes {
                text = text.with_passes();
            }
            Box::new(text)
        }
    };
    print!("{}", formatter.format(&result));

    // Show timing statistics if requested
    if cli.timing {
        eprintln!();
        eprintln!("{}", result.format_timings());
    }

    std::process::exit(result.exit_code());
}
