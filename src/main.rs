//! Entry point of the `localize` command.

use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{
    Args,
    Parser,
    Subcommand,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use xcstrings_localize::commands::{
    self,
    TranslateOptions,
};
use xcstrings_localize::config::{
    ConfigManager,
    SettingsOverrides,
};
use xcstrings_localize::error::LocalizeError;
use xcstrings_localize::translator::OpenAiTranslator;

/// A tool for managing localization files
#[derive(Debug, Parser)]
#[command(name = "localize", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// サブコマンド
#[derive(Debug, Subcommand)]
enum Command {
    /// Translate an xcstrings file to specified languages
    Translate(TranslateArgs),

    /// Show information about an xcstrings file
    Info {
        /// Path to the xcstrings file
        file: PathBuf,

        /// Languages to report on (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        languages: Option<Vec<String>>,
    },
}

/// `translate` の引数
#[derive(Debug, Args)]
struct TranslateArgs {
    /// Path to the xcstrings file
    file: PathBuf,

    /// Target languages (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    languages: Option<Vec<String>>,

    /// OpenAI API key (defaults to the OPENAI_API_KEY environment variable)
    #[arg(short, long)]
    api_key: Option<String>,

    /// OpenAI model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Batch size for parallel processing
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Save the translations that succeeded even if others failed
    #[arg(long)]
    keep_partial: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(error = ?error, "Command failed");
            let _ = writeln!(std::io::stderr().lock(), "Error: {error}");
            if error.is_configuration() { ExitCode::from(2) } else { ExitCode::FAILURE }
        }
    }
}

/// ログを標準エラー出力に出す
///
/// `RUST_LOG` があればそれに従い、なければ `info`（`--verbose` なら `debug`）。
fn init_tracing(verbose: bool) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,xcstrings_localize={level},localize={level}")));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_target(false).init();
    guard
}

async fn run(command: Command) -> Result<(), LocalizeError> {
    match command {
        Command::Translate(args) => translate(args).await,
        Command::Info { file, languages } => {
            let languages = languages.map(trim_languages);
            commands::info(&file, languages.as_deref(), &mut std::io::stdout().lock())
        }
    }
}

/// 設定と API キーを解決して翻訳する
async fn translate(args: TranslateArgs) -> Result<(), LocalizeError> {
    let api_key =
        ConfigManager::resolve_api_key(args.api_key, |name| std::env::var(name).ok())?;

    let mut config = ConfigManager::new();
    config.load_settings(args.file.parent().map(Path::to_path_buf))?;
    config.apply_overrides(SettingsOverrides {
        model: args.model,
        batch_size: args.batch_size,
        target_languages: args.languages.map(trim_languages),
    })?;

    let settings = config.get_settings().clone();
    let translator = OpenAiTranslator::new(api_key, &settings)?;
    let options = TranslateOptions { settings, keep_partial: args.keep_partial };

    let summary = commands::translate(&args.file, Arc::new(translator), &options).await?;
    write!(std::io::stdout().lock(), "{summary}")?;
    Ok(())
}

/// `-l "es, fr"` のような空白を取り除く
fn trim_languages(languages: Vec<String>) -> Vec<String> {
    languages.into_iter().map(|language| language.trim().to_string()).collect()
}
