//! CLI entrypoint for chorus
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use chorus_application::{
    DispatchParams, FanOutDispatcher, ProgressNotifier, ResultStore, SubmitComparisonInput,
    SubmitComparisonUseCase,
};
use chorus_domain::{OutputFormat, ProviderId, RunId, Severity};
use chorus_infrastructure::{
    ConfigLoader, FileConfig, InMemoryResultStore, SqliteResultStore, SqliteStoreConfig,
    StorageBackend, build_classifiers,
};
use chorus_presentation::{Cli, Command, ConsoleFormatter, ProgressReporter, SimpleProgress};
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    check_config(&config)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    info!("Starting chorus");

    if let Some(command) = cli.command.clone() {
        let store = build_store(&config).await?;
        return run_command(command, store.as_ref()).await;
    }

    let Some(prompt) = cli.prompt.clone() else {
        bail!("A prompt is required. Run `chorus --help` for usage.");
    };

    // === Dependency Injection ===
    let (mut params, _) = config.dispatch.to_dispatch_params();
    if let Some(secs) = cli.timeout {
        if secs == 0 {
            bail!("--timeout must be greater than zero");
        }
        params = params.with_timeout(Duration::from_secs(secs));
    }

    let dispatcher = Arc::new(build_dispatcher(&config, params));
    let use_case = if opens_store(&cli) {
        SubmitComparisonUseCase::new(dispatcher, build_store(&config).await?)
    } else {
        SubmitComparisonUseCase::without_store(dispatcher)
    };

    let mut input = SubmitComparisonInput::new(prompt);
    if let Some(hint) = &cli.category_hint {
        input = input.with_category_hint(hint.clone());
    }
    if !cli.provider.is_empty() {
        input = input.with_providers(cli.provider.iter().copied());
    }
    if cli.no_save {
        input = input.without_save();
    }

    let outcome = if cli.quiet {
        use_case.execute(input).await?
    } else {
        let progress: Box<dyn ProgressNotifier> = if std::io::stderr().is_terminal() {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        };
        use_case
            .execute_with_progress(input, progress.as_ref())
            .await?
    };

    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    println!("{}", ConsoleFormatter::render(&outcome.run, format));

    if let Some(e) = &outcome.storage_error {
        warn!("Run was not saved: {}", e);
        eprintln!("warning: run was not saved: {}", e);
    }

    if outcome.all_failed {
        warn!("No provider returned a usable verdict");
    }

    Ok(())
}

/// Set up stderr logging by verbosity, plus an optional log file
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Print warnings and fail on errors found in the loaded configuration
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in issues.iter().filter(|i| i.severity == Severity::Warning) {
        warn!("{}", issue.message);
    }

    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.to_string())
        .collect();
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(())
}

fn build_dispatcher(config: &FileConfig, params: DispatchParams) -> FanOutDispatcher {
    let classifiers = build_classifiers(
        ProviderId::ALL
            .into_iter()
            .map(|provider| (provider, config.providers.settings(provider))),
    );
    FanOutDispatcher::new(classifiers, params)
}

/// A dry run (`--no-save` without a subcommand) never opens or creates the database
fn opens_store(cli: &Cli) -> bool {
    cli.command.is_some() || !cli.no_save
}

async fn build_store(config: &FileConfig) -> Result<Arc<dyn ResultStore>> {
    let (backend, _) = config.storage.parse_backend();
    let store: Arc<dyn ResultStore> = match backend {
        StorageBackend::Sqlite => {
            let store = SqliteResultStore::connect(SqliteStoreConfig::new(&config.storage.url))
                .await
                .with_context(|| format!("Failed to open result store at {}", config.storage.url))?;
            Arc::new(store)
        }
        StorageBackend::Memory => Arc::new(InMemoryResultStore::new()),
    };
    Ok(store)
}

/// Run a query subcommand against the result store
async fn run_command(command: Command, store: &dyn ResultStore) -> Result<()> {
    match command {
        Command::Stats => {
            let stats = store.stats().await?;
            print!("{}", ConsoleFormatter::format_stats(&stats));
        }
        Command::Disagreements { limit, offset } => {
            let runs = store.list_disagreements(limit, offset).await?;
            print!("{}", ConsoleFormatter::format_run_list(&runs));
        }
        Command::History { limit, offset } => {
            let runs = store.list_runs(limit, offset).await?;
            print!("{}", ConsoleFormatter::format_run_list(&runs));
        }
        Command::Show { id } => match store.get(RunId(id)).await? {
            Some(run) => println!("{}", ConsoleFormatter::format_run(&run)),
            None => bail!("Run #{} not found", id),
        },
        Command::Annotate { id, category } => {
            let run = store.annotate(RunId(id), &category).await?;
            println!("{}", ConsoleFormatter::format_summary(&run));
        }
    }
    Ok(())
}
