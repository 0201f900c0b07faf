// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use pdftrans::app_config::{self, Config, Engine};
use pdftrans::app_controller::{Controller, TranslateRequest};
use pdftrans::reassembly::{KindFilter, ReassemblyOptions};

/// CLI Wrapper for Engine to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEngine {
    Default,
    #[value(name = "openai")]
    OpenAI,
    Gemini,
    Claude,
}

impl From<CliEngine> for Engine {
    fn from(cli_engine: CliEngine) -> Self {
        match cli_engine {
            CliEngine::Default => Engine::Default,
            CliEngine::OpenAI => Engine::OpenAI,
            CliEngine::Gemini => Engine::Gemini,
            CliEngine::Claude => Engine::Claude,
        }
    }
}

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
    /// Translate a PDF document (default command)
    Translate(TranslateArgs),

    /// Merge chunk directories left by earlier runs
    Merge(MergeArgs),

    /// Generate shell completions for pdftrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// PDF file to translate
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Additional path for the translated document
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source language (e.g. 'english', 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language (e.g. 'japanese', 'ja')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliEngine>,

    /// Model name for API engines
    #[arg(short, long)]
    model: Option<String>,

    /// Pages per chunk
    #[arg(short, long)]
    pages_per_chunk: Option<usize>,

    /// Chunks translated at the same time
    #[arg(long)]
    max_concurrent_chunks: Option<usize>,

    /// Split the document even when it is small
    #[arg(long)]
    force_chunking: bool,

    /// Configuration file path
    #[arg(short, long, env = "PDFTRANS_CONFIG", default_value = "pdftrans.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Directory containing chunk_NNN directories
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Where merged files are written (defaults to DIRECTORY)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep chunk files after merging
    #[arg(short, long)]
    keep_originals: bool,

    /// Only merge this project
    #[arg(short, long)]
    project: Option<String>,

    /// Which artifacts to merge
    #[arg(short = 't', long = "type", value_enum, default_value = "both")]
    kind: KindFilter,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// pdftrans - translate large PDF documents chunk by chunk
///
/// Splits large PDFs into page-range chunks, translates each chunk with
/// pdf2zh (optionally backed by OpenAI, Gemini or Claude), and merges the
/// results into a translated and a bilingual document.
#[derive(Parser, Debug)]
#[command(name = "pdftrans")]
#[command(version)]
#[command(about = "Chunked PDF translation tool")]
#[command(long_about = "pdftrans splits large PDFs into chunks, translates them and merges the results.

EXAMPLES:
    pdftrans paper.pdf                          # Translate using default config
    pdftrans -t german paper.pdf                # Translate into German
    pdftrans -e openai -m gpt-4o paper.pdf      # Use a specific engine and model
    pdftrans -p 10 --force-chunking paper.pdf   # Always split, 10 pages per chunk
    pdftrans merge output/japanese              # Merge chunk directories
    pdftrans completions bash > pdftrans.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in pdftrans.json by default. You can specify a
    different file with --config-path. If the file doesn't exist, a default
    one is created automatically.

ENGINES:
    default - pdf2zh built-in translation service
    openai  - OpenAI models (requires OPENAI_API_KEY or config)
    gemini  - Google Gemini (requires GEMINI_API_KEY or config)
    claude  - Anthropic Claude (requires ANTHROPIC_API_KEY or config)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// PDF file to translate
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Additional path for the translated document
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source language (e.g. 'english', 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language (e.g. 'japanese', 'ja')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliEngine>,

    /// Model name for API engines
    #[arg(short, long)]
    model: Option<String>,

    /// Pages per chunk
    #[arg(short, long)]
    pages_per_chunk: Option<usize>,

    /// Chunks translated at the same time
    #[arg(long)]
    max_concurrent_chunks: Option<usize>,

    /// Split the document even when it is small
    #[arg(long)]
    force_chunking: bool,

    /// Configuration file path
    #[arg(short, long, env = "PDFTRANS_CONFIG", default_value = "pdftrans.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
//
// Filtering follows `log::max_level()`, so the level can be changed after
// initialization once the configuration is loaded.
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Start at info; the configured level is applied once it is known
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pdftrans", &mut std::io::stdout());
            Ok(true)
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        Some(Commands::Merge(args)) => run_merge(args),
        None => match cli.input {
            // Default behavior - use top-level args
            Some(input) => {
                let translate_args = TranslateArgs {
                    input,
                    output: cli.output,
                    source_language: cli.source_language,
                    target_language: cli.target_language,
                    engine: cli.engine,
                    model: cli.model,
                    pages_per_chunk: cli.pages_per_chunk,
                    max_concurrent_chunks: cli.max_concurrent_chunks,
                    force_chunking: cli.force_chunking,
                    config_path: cli.config_path,
                    log_level: cli.log_level,
                };
                run_translate(translate_args).await
            }
            None => Err(anyhow!("INPUT is required when no subcommand is specified")),
        },
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(engine) = &options.engine {
        config.translation.engine = engine.clone().into();
    }

    if let Some(model) = &options.model {
        let engine = config.translation.engine;
        config.translation.get_or_insert_engine_config(engine).model = model.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(pages) = options.pages_per_chunk {
        config.chunking.pages_per_chunk = pages;
    }

    if let Some(max_concurrent) = options.max_concurrent_chunks {
        config.chunking.max_concurrent_chunks = max_concurrent;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(options: TranslateArgs) -> Result<bool> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let (mut config, created) = Config::load_or_create(&options.config_path)?;
    if created {
        warn!(
            "Config file not found at '{}', created default config.",
            options.config_path
        );
    }

    apply_overrides(&mut config, &options);
    config.apply_env_api_keys();
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;
    let request = TranslateRequest {
        input: options.input,
        output: options.output,
        force_chunking: options.force_chunking,
    };

    let report = controller.run(request).await?;
    if let Some(path) = report.primary_output() {
        info!("Success: {:?}", path);
    }
    Ok(true)
}

fn run_merge(options: MergeArgs) -> Result<bool> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let controller = Controller::with_config(Config::default())?;
    let reassembly_options = ReassemblyOptions {
        output_dir: options.output_dir,
        keep_originals: options.keep_originals,
        project: options.project,
        kind: options.kind,
    };

    let summary = controller.run_merge(&options.directory, &reassembly_options)?;
    Ok(summary.is_success())
}
