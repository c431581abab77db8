//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crossweave_core::pipeline::{ProgressReporter, RunConfig, RunResult};
use crossweave_shared::{AppConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Crossweave: weave goals, documents, and timelines into one schema.
#[derive(Parser)]
#[command(
    name = "crossweave",
    version,
    about = "Cross-reference project goals, documents, and timeline periods into a knowledge-integration schema.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
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
    /// Run the pipeline and write the knowledge-integration schema.
    Run {
        /// Root directory the configured paths are resolved against
        /// (defaults to the current directory).
        #[arg(short, long)]
        root: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "crossweave=info",
        1 => "crossweave=debug",
        _ => "crossweave=trace",
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
    match cli.command {
        Command::Run { root } => cmd_run(root.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn cmd_run(root: Option<&str>) -> Result<()> {
    let config = load_config()?;

    let root = match root {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let run_config = RunConfig {
        paths: config.paths.resolve(&root),
        frameworks: config.frameworks,
    };

    info!(root = %root.display(), "running knowledge-integration pipeline");

    let reporter = CliProgress::new();
    let result = crossweave_core::pipeline::run(&run_config, &reporter)?;

    println!();
    println!("  Knowledge schema written!");
    println!("  Goals:     {}", result.goals_loaded);
    println!("  Documents: {}", result.documents_parsed);
    println!("  Periods:   {}", result.periods);
    if result.tables_skipped > 0 || result.rows_dropped > 0 {
        println!(
            "  Skipped:   {} table(s), {} row(s)",
            result.tables_skipped, result.rows_dropped
        );
    }
    println!("  Output:    {}", result.schema_path.display());
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();
    println!("{}", result.coverage_summary);

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
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &RunResult) {
        self.spinner.finish_and_clear();
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
