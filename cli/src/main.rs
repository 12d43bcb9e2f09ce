//! CLI entrypoint for council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{CouncilSession, SessionEventLog, SessionProgress};
use council_domain::{EscapePolicy, ModelId, Provider, SessionAction, SessionState};
use council_infrastructure::{ConfigLoader, FileConfig, HttpCouncilGateway, JsonlSessionLog, Severity};
use council_presentation::{
    Cli, ConsoleFormatter, ExportRenderer, ProgressReporter, SessionRepl, SimpleProgress,
};
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli)?;

    info!("Starting council");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let mut config = load_config(&cli);
    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.clone();
    }
    if !config.output.color {
        ConsoleFormatter::set_color(false);
    }
    for issue in config.validate() {
        match issue.severity {
            Severity::Warning => warn!("Config: {}", issue),
            Severity::Error => eprintln!("Config error: {}", issue),
        }
    }
    if !config.is_usable() {
        bail!("Configuration is not usable; see the errors above.");
    }

    // === Dependency Injection ===
    let gateway = Arc::new(
        HttpCouncilGateway::from_config(&config.backend)
            .context("Failed to create the backend client")?,
    );
    info!("Backend: {}", gateway.base_url());

    let mut session = CouncilSession::new(gateway);
    if !cli.quiet {
        let progress: Arc<dyn SessionProgress> = if std::io::stderr().is_terminal() {
            Arc::new(ProgressReporter::new())
        } else {
            Arc::new(SimpleProgress)
        };
        session = session.with_progress(progress);
    }
    if let Some(path) = config.logging.session_log_path() {
        match JsonlSessionLog::open(&path) {
            Some(log) => {
                let log: Arc<dyn SessionEventLog> = Arc::new(log);
                session = session.with_session_log(log);
            }
            None => warn!("Session log disabled: cannot open {}", path.display()),
        }
    }
    let session = Arc::new(session);

    session.start().await;
    apply_preferences(&session, &cli, &config).await;

    let escape = if cli.escape_html {
        EscapePolicy::Html
    } else {
        config.output.escape_policy()
    };
    let renderer = ExportRenderer::new().with_escape(escape);

    if cli.list {
        print_catalogs(&session.snapshot());
        return Ok(());
    }

    if cli.wants_repl() {
        if let Some(question) = &cli.question {
            session
                .dispatch(SessionAction::SetQuestion(question.clone()))
                .await;
            session.dispatch(SessionAction::SubmitQuestion).await;
        }
        let repl = SessionRepl::new(session.clone())
            .with_renderer(renderer)
            .with_export_format(config.session.export_format);
        repl.run().await?;
        return Ok(());
    }

    run_one_shot(&session, &cli, renderer).await
}

/// Install the tracing subscriber; the guard must live until exit.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

/// Load configuration, falling back to defaults when a file is broken
fn load_config(cli: &Cli) -> FileConfig {
    if cli.no_config {
        return ConfigLoader::load_defaults();
    }
    match ConfigLoader::load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}", e);
            ConfigLoader::load_defaults()
        }
    }
}

/// Select the configured (or requested) provider and model
async fn apply_preferences(session: &CouncilSession, cli: &Cli, config: &FileConfig) {
    let provider = cli
        .provider
        .as_deref()
        .map(Provider::from_id)
        .or_else(|| config.session.provider());
    if let Some(provider) = provider {
        let label = provider.label().to_string();
        if !session.dispatch(SessionAction::SelectProvider(provider)).await {
            warn!("Provider {} is not available; keeping the default", label);
        }
    }

    let model = cli
        .model
        .as_deref()
        .map(ModelId::from)
        .or_else(|| config.session.model())
        .filter(|m| !m.as_str().trim().is_empty());
    if let Some(model) = model {
        let name = model.to_string();
        if !session.dispatch(SessionAction::SelectModel(model)).await {
            warn!("Model {} is not offered by the selected provider", name);
        }
    }
}

fn print_catalogs(state: &SessionState) {
    if let Some(catalog) = state.perspectives() {
        print!("{}", ConsoleFormatter::format_perspectives(catalog, state));
    }
    if let Some(catalog) = state.providers() {
        print!("{}", ConsoleFormatter::format_providers(catalog, state));
    }
    print!("{}", ConsoleFormatter::format_models(state));
    if let Some(error) = state.error() {
        eprint!("{}", ConsoleFormatter::format_error(error));
    }
}

/// Answer from each requested perspective, optionally conclude, then print
/// or export.
async fn run_one_shot(session: &CouncilSession, cli: &Cli, renderer: ExportRenderer) -> Result<()> {
    let Some(question) = cli.question.clone() else {
        bail!("Question is required. Use --interactive for the REPL.");
    };

    let state = session.snapshot();
    let Some(catalog) = state.perspectives().cloned() else {
        let message = state
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Perspectives are not loaded.".to_string());
        bail!(message);
    };

    session.dispatch(SessionAction::SetQuestion(question)).await;
    if !session.dispatch(SessionAction::SubmitQuestion).await {
        bail!("The question is empty.");
    }

    let perspectives = if cli.perspective.is_empty() {
        catalog.first().cloned().into_iter().collect::<Vec<_>>()
    } else {
        let mut ids = Vec::new();
        for name in &cli.perspective {
            match catalog.find(name) {
                Some(id) => ids.push(id.clone()),
                None => bail!("Unknown perspective: {}", name),
            }
        }
        ids
    };

    for perspective in perspectives {
        session
            .dispatch(SessionAction::SelectPerspective(perspective.clone()))
            .await;
        let state = session.snapshot();
        if !state.can_generate_answer() {
            let reason = state
                .error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "No provider or model is selected.".to_string());
            bail!(reason);
        }
        session.dispatch(SessionAction::RequestAnswer).await;
        if let Some(error) = session.snapshot().error() {
            eprintln!("{} ({})", error, perspective);
            session.dispatch(SessionAction::DismissError).await;
        }
    }

    if cli.conclude {
        if session.snapshot().can_synthesize() {
            session.dispatch(SessionAction::RequestConclusion).await;
            if let Some(error) = session.snapshot().error() {
                eprint!("{}", ConsoleFormatter::format_error(error));
            }
        } else {
            warn!("A conclusion needs at least two answers");
        }
    }

    let state = session.snapshot();
    if state.answers().is_empty() {
        bail!("No answers were generated.");
    }

    match cli.export {
        Some(format) => {
            let document = renderer.render_state(format, &state);
            match cli.export_destination() {
                Some(path) => {
                    let written = document
                        .save(&path)
                        .with_context(|| format!("Cannot write {}", path.display()))?;
                    print!("{}", ConsoleFormatter::format_session(&state));
                    println!("Exported to {}", written.display());
                }
                None => print!("{}", document.content),
            }
        }
        None => print!("{}", ConsoleFormatter::format_session(&state)),
    }

    Ok(())
}
