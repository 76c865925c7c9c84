// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use subreflow::app_config::{self, Config, TranslationProvider};
use subreflow::app_controller::{Controller, RunOptions};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
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
    /// Merge, translate and reflow a subtitle file or folder (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for subreflow
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct TranslateArgs {
    /// Input .srt file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output file (single-file mode; defaults to <stem>.<target>.srt)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'zh', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Number of captions per translation request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// API key for the provider (overrides the config file)
    #[arg(long, env = "REFLOW_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Keep captions as they are instead of merging sentence fragments
    #[arg(long)]
    no_merge: bool,

    /// Keep the original caption timing after translation
    #[arg(long)]
    no_reflow: bool,

    /// Only clean up and merge; write the source text without translating
    #[arg(long)]
    skip_translation: bool,

    /// Also write a two-track ASS script (single-file mode)
    #[arg(long, value_name = "FILE")]
    bilingual_ass: Option<PathBuf>,
}

/// subreflow - sentence-aware subtitle translation
///
/// Merges captions that split one sentence, translates them in numbered batches
/// with an AI provider and rescales each caption's timing to the translated text.
#[derive(Parser, Debug)]
#[command(name = "subreflow")]
#[command(version)]
#[command(about = "Sentence-aware subtitle merging, translation and timing reflow")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "subreflow merges fragmented captions into sentences, translates them with AI providers \
and rescales every caption's display time to the length of its translation.

EXAMPLES:
    subreflow talk.srt                          # Translate using default config
    subreflow -f talk.srt                       # Force overwrite existing output
    subreflow -p openai -m gpt-4o talk.srt      # Use specific provider and model
    subreflow -s en -t es talk.srt              # Translate from English to Spanish
    subreflow --skip-translation talk.srt       # Only clean up and merge
    subreflow --bilingual-ass talk.ass talk.srt # Also write a two-track ASS script
    subreflow --log-level debug /subtitles/     # Process a directory with debug logging
    subreflow completions bash > subreflow.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: Option<TranslateArgs>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger; the effective level is adjusted later via set_max_level
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker and ANSI colour for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "\x1B[1;31m"),
            Level::Warn => ("WARN ", "\x1B[1;33m"),
            Level::Info => ("INFO ", "\x1B[1;32m"),
            Level::Debug => ("DEBUG", "\x1B[1;36m"),
            Level::Trace => ("TRACE", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (marker, colour) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config and flags have been read
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subreflow", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            let args = cli
                .translate
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
            run_translate(args).await
        }
    }
}

// @applies: Command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(api_key) = options.api_key.as_ref().filter(|k| !k.is_empty()) {
        config.translation.active_provider_config_mut().api_key = api_key.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(batch_size) = options.batch_size {
        config.translation.common.batch_size = batch_size;
    }

    if options.no_merge {
        config.merge.enabled = false;
    }

    if options.no_reflow {
        config.reflow.enabled = false;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // Apply a command line level before the config is even read
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    if !options.input_path.exists() {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    let run_options = RunOptions {
        skip_translation: options.skip_translation,
        bilingual_ass: options.bilingual_ass.clone(),
        show_progress: true,
    };

    let controller = Controller::new(config, run_options).context("Configuration validation failed")?;

    let cancel_flag = controller.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the current batch before stopping");
            cancel_flag.store(true, Ordering::SeqCst);
        }
    });

    if options.input_path.is_dir() {
        if options.output.is_some() || options.bilingual_ass.is_some() {
            warn!("--output and --bilingual-ass apply to single files and are ignored in folder mode");
        }
        controller
            .run_folder(options.input_path.clone(), options.force_overwrite)
            .await?;
    } else {
        let written = controller
            .run(options.input_path.clone(), options.output.clone(), options.force_overwrite)
            .await?;
        if written.is_none() {
            info!("Nothing written");
        }
    }

    Ok(())
}
