// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use subresync::app_config::{self, Config, TranslationProvider};
use subresync::language_utils;
use subresync::segmentation::DetectorRegistry;
use subresync::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Deepl,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Deepl => TranslationProvider::DeepL,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
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
    /// Translate SRT files (default command)
    Translate(TranslateArgs),

    /// Show how fragmented sample cues are merged and split
    Demo {
        /// Language used to pick the sentence detector
        #[arg(short = 'L', long, default_value = "en")]
        lang: String,
    },

    /// List supported target languages
    Languages,

    /// Send a test request to the configured provider
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,

        /// DeepL API key
        #[arg(long, env = "DEEPL_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Generate shell completions for subresync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input SRT file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output directory (defaults to the input file's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Source language code (e.g., 'en', 'de'), or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'TR', 'EN-US')
    #[arg(short, long)]
    target_language: Option<String>,

    /// DeepL API key
    #[arg(long, env = "DEEPL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Formality: default, more, less, prefer_more, prefer_less
    #[arg(long)]
    formality: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subresync - sentence-aware SRT translation
///
/// Merges caption fragments into whole sentences, translates them, and splits
/// the translations back over the original cues and their timings.
#[derive(Parser, Debug)]
#[command(name = "subresync")]
#[command(version)]
#[command(about = "Sentence-aware SRT caption translation")]
#[command(long_about = "subresync merges caption fragments into sentences, translates them and \
redistributes the translation over the original cues.

EXAMPLES:
    subresync movie.srt                         # Translate using default config
    subresync -f movie.srt                      # Force overwrite existing files
    subresync -s en -t DE movie.srt             # Translate from English to German
    subresync -p mock movie.srt                 # Dry run with the mock translator
    subresync --log-level debug /captions/      # Process a whole directory
    subresync demo                              # Show merge and split on sample cues
    subresync completions bash > subresync.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input SRT file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output directory (defaults to the input file's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Source language code (e.g., 'en', 'de'), or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'TR', 'EN-US')
    #[arg(short, long)]
    target_language: Option<String>,

    /// DeepL API key
    #[arg(long, env = "DEEPL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Formality: default, more, less, prefer_more, prefer_less
    #[arg(long)]
    formality: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code and emoji for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("31", "❌ "),
            Level::Warn => ("33", "🚧 "),
            Level::Info => ("32", " "),
            Level::Debug => ("36", "🔍 "),
            Level::Trace => ("35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[1;{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subresync", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Demo { lang }) => {
            println!("{}", Controller::demo_report(&DetectorRegistry::default(), &lang));
            Ok(())
        }
        Some(Commands::Languages) => {
            for (code, name) in language_utils::DEEPL_LANGUAGES {
                println!("{:<6} {}", code, name);
            }
            Ok(())
        }
        Some(Commands::Check { config_path, api_key }) => run_check(&config_path, api_key).await,
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            let translate_args = TranslateArgs {
                input_path,
                output_dir: cli.output_dir,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                source_language: cli.source_language,
                target_language: cli.target_language,
                api_key: cli.api_key,
                formality: cli.formality,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_translate(translate_args).await
        }
    }
}

fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.to_uppercase();
    }
    if let Some(api_key) = &options.api_key {
        config.translation.api_key = api_key.clone();
    }
    if let Some(formality) = &options.formality {
        config.translation.formality = formality.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(LevelFilter::from(&level));
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(LevelFilter::from(&config.log_level));

    info!(
        "subresync: {} -> {} with {}",
        config.source_language,
        config.target_language,
        config.translation.provider.display_name()
    );
    if config.translation.provider == TranslationProvider::DeepL {
        info!("Using API key {}", config.translation.masked_api_key());
    }

    let controller = Controller::with_config(config)?;

    if options.input_path.is_file() {
        let output_dir = options
            .output_dir
            .clone()
            .or_else(|| options.input_path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        controller.run(options.input_path.clone(), output_dir, options.force_overwrite).await?;
    } else if options.input_path.is_dir() {
        if options.output_dir.is_some() {
            warn!("--output-dir is ignored in folder mode, outputs are written next to their inputs");
        }
        let summary = controller.run_folder(options.input_path.clone(), options.force_overwrite).await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} of {} files failed", summary.failed, summary.processed + summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}

async fn run_check(config_path: &str, api_key: Option<String>) -> Result<()> {
    let mut config = Config::load_or_create(config_path)?;
    if let Some(api_key) = api_key {
        config.translation.api_key = api_key;
    }
    log::set_max_level(LevelFilter::from(&config.log_level));

    let translator = Controller::build_translator(&config)?;
    match translator.test_connection().await {
        Ok(()) => {
            info!("{} connection OK", translator.name());
            Ok(())
        }
        Err(e) => {
            error!("{} connection failed: {}", translator.name(), e);
            Err(e.into())
        }
    }
}
