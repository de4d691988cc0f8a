// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use digestr::app_config::{self, Config};
use digestr::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for digestr
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// digestr - summarize documents of any length
///
/// Splits a document into word windows, summarizes each window with a T5
/// model and summarizes the joined partial summaries once more.
#[derive(Parser, Debug)]
#[command(name = "digestr")]
#[command(version)]
#[command(about = "Chunk-and-reduce document summarizer")]
#[command(long_about = "digestr summarizes a document of any length with a locally run T5 model.

EXAMPLES:
    digestr article.txt                         # Summarize a file using default config
    cat article.txt | digestr                   # Summarize standard input
    digestr -w 400 article.txt                  # Use 400-word segments
    digestr -m google-t5/t5-small article.txt   # Use a smaller checkpoint
    digestr --cpu --offline article.txt         # CPU only, cached model files only
    digestr --dry-run article.txt               # Exercise the pipeline without a model
    digestr completions bash > digestr.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Text file to summarize; standard input when omitted or '-'
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Maximum number of words per segment
    #[arg(short = 'w', long)]
    max_words: Option<usize>,

    /// Model repository to load (e.g., 'google-t5/t5-base')
    #[arg(short, long)]
    model: Option<String>,

    /// Never use an accelerator
    #[arg(long)]
    cpu: bool,

    /// Only use cached model files
    #[arg(long)]
    offline: bool,

    /// Use the echo provider instead of loading a model
    #[arg(long)]
    dry_run: bool,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config has been read
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "digestr", &mut std::io::stdout());
        return Ok(());
    }

    run_summarize(cli).await
}

async fn run_summarize(options: CommandLineOptions) -> Result<()> {
    // If log level is set via command line, apply it before touching the config
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    let summary = controller
        .run(options.input_path.as_deref(), options.dry_run)
        .await
        .context("Summarization failed")?;

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}", summary)?;
    stdout.flush()?;
    Ok(())
}

/// Override config values with CLI options if provided
fn apply_overrides(config: &mut Config, options: &CommandLineOptions) {
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(max_words) = options.max_words {
        config.summarizer.max_words = max_words;
    }
    if let Some(model) = &options.model {
        config.model.repo = model.clone();
    }
    if options.cpu {
        config.model.force_cpu = true;
    }
    if options.offline {
        config.model.offline = true;
    }
}
