//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use pressrun_core::{PublishConfig, PublishProgress, PublishReport};
use pressrun_shared::{
    CONFIG_FILE_NAME, PressrunConfig, PublishStage, Stem, init_config, load_config,
};
use pressrun_tools::ProcessRunner;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// pressrun — publish a single-author blog from plain sources.
#[derive(Parser)]
#[command(
    name = "pressrun",
    version,
    about = "Publish Markdown documents and notebooks as blog articles, briefs, and media.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to the config file (defaults to ./pressrun.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Publish a source document (or every document with --all).
    Publish {
        /// Source file to publish (.md or .ipynb).
        #[arg(required_unless_present = "all")]
        path: Option<PathBuf>,

        /// Publish every recognized source in the sources directory.
        #[arg(long, conflicts_with = "path")]
        all: bool,
    },

    /// Rebuild the RSS feed from the published briefs.
    Feed,

    /// List published articles with their titles.
    List,

    /// Write a starter pressrun.toml in the working directory.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved effective configuration.
    ConfigShow,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pressrun=info",
        1 => "pressrun=debug",
        _ => "pressrun=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    match cli.command {
        Command::Publish { path, all } => {
            cmd_publish(config_path.as_deref(), path.as_deref(), all)
        }
        Command::Feed => cmd_feed(config_path.as_deref()),
        Command::List => cmd_list(config_path.as_deref()),
        Command::Init { force } => cmd_init(config_path.as_deref(), force),
        Command::ConfigShow => cmd_config_show(config_path.as_deref()),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_publish(config_path: Option<&Path>, source: Option<&Path>, all: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let publish_config = PublishConfig::from_config(&config);
    let runner = ProcessRunner;
    let reporter = CliProgress::new();

    if all {
        info!(
            sources = %publish_config.paths.sources.display(),
            "publishing all sources"
        );
        let batch = pressrun_core::publish_all(&publish_config, &runner, &reporter)?;
        reporter.clear();

        println!();
        println!("  Published: {}", batch.reports.len());
        if !batch.failures.is_empty() {
            println!("  Failed:    {}", batch.failures.len());
            for (path, error) in &batch.failures {
                println!("    {}: {error}", path.display());
            }
            println!();
            return Err(eyre!(
                "{} of {} sources failed to publish",
                batch.failures.len(),
                batch.failures.len() + batch.reports.len()
            ));
        }
        println!();
        Ok(())
    } else {
        let source = source.ok_or_else(|| eyre!("provide a source path or --all"))?;
        info!(source = %source.display(), "publishing document");

        let report = pressrun_core::publish(&publish_config, &runner, source, &reporter)?;
        reporter.clear();

        println!();
        println!("  Published {}", report.stem);
        println!("  Kind:     {}", report.kind.as_str());
        println!("  Article:  {}", report.article_path.display());
        println!("  Brief:    {}", report.brief_path.display());
        println!("  Figures:  {}", report.figures_copied);
        println!("  Formulas: {}", report.formulas_rasterized);
        println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());
        println!();
        Ok(())
    }
}

fn cmd_feed(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let path = pressrun_feed::write_feed(&config)?;
    println!("Feed written to: {}", path.display());
    Ok(())
}

fn cmd_list(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let briefs_dir = PathBuf::from(&config.paths.briefs);

    let mut rows: Vec<(String, String)> = Vec::new();
    if briefs_dir.is_dir() {
        for entry in std::fs::read_dir(&briefs_dir)? {
            let path = entry?.path();
            if !path.is_file() || !path.extension().is_some_and(|e| e == "md") {
                continue;
            }
            let stem = Stem::from_path(&path)?;
            let text = std::fs::read_to_string(&path)?;
            let title = pressrun_feed::brief_title(&text)
                .unwrap_or("(untitled)")
                .to_string();
            rows.push((stem.to_string(), title));
        }
    }
    rows.sort();

    if rows.is_empty() {
        println!("No articles published yet.");
        return Ok(());
    }
    for (stem, title) in &rows {
        println!("  {stem}  {title}");
    }
    println!();
    println!("  {} article(s)", rows.len());
    Ok(())
}

fn cmd_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let path = init_config(&path, force)?;
    println!("Config written to: {}", path.display());
    println!("Edit the [site] section before publishing.");
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: PressrunConfig = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        self.spinner.finish_and_clear();
    }
}

impl PublishProgress for CliProgress {
    fn stage(&self, stem: &Stem, stage: PublishStage) {
        self.spinner.set_message(format!("{stem}: {stage}"));
    }

    fn done(&self, report: &PublishReport) {
        self.spinner.println(format!(
            "  published {} ({:.1}s)",
            report.stem,
            report.elapsed.as_secs_f64()
        ));
    }
}
