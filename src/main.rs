use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clihost::application::{
    CommandDispatcher, CommandRegistry, EnvironmentResolver, LifecycleRunner,
    WaitForDebuggerInterceptor,
};
use clihost::cli::{output, CliError, CliResult};
use clihost::commands::register_commands;
use clihost::config::Settings;
use clihost::domain::{ExecutionOutcome, ExitCodeCell};
use clihost::infrastructure::di::ServiceCollection;
use clihost::infrastructure::host::{Host, HostLifetime, HostedService};
use clihost::infrastructure::traits::{EnvSource, ProcDebuggerProbe, RealEnv};
use colored::Colorize;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(exit_code) => exit_code.get(),
        Err(e) => {
            output::error(&e);
            e.exit_code()
        }
    };
    std::process::exit(exit_code);
}

async fn run() -> CliResult<ExitCodeCell> {
    let env: Arc<dyn EnvSource> = Arc::new(RealEnv);
    let resolver = EnvironmentResolver::new(env.clone());
    let environment = resolver.environment()?;

    let settings = Settings::load(&base_dir(), &environment)?;
    setup_logging(&settings.logging.level);
    tracing::info!("environment: {}", environment);
    match settings.to_toml() {
        Ok(text) => tracing::debug!("effective settings:\n{}", text),
        Err(e) => tracing::warn!("cannot render settings: {}", e),
    }

    let app = settings.app_info();
    output::set_title(&app.name, &app.version);

    let mut registry = CommandRegistry::new();
    register_commands(&mut registry)?;

    let mut services = ServiceCollection::new();
    services.add_instance(app.clone()).add_instance(settings.clone());
    registry.register_handlers(&mut services);

    let interceptor = WaitForDebuggerInterceptor::with_poll_interval(
        Arc::new(ProcDebuggerProbe),
        Duration::from_millis(settings.debugger.poll_interval_ms),
    );
    let dispatcher = CommandDispatcher::new(
        registry,
        Arc::new(services.into_container()),
        Arc::new(interceptor),
        app,
    );

    let lifetime = HostLifetime::new();
    let runner = Arc::new(LifecycleRunner::new(
        Arc::new(dispatcher),
        resolver.command_line_arguments(),
        lifetime.clone(),
    ));
    let services: Vec<Arc<dyn HostedService>> = vec![runner.clone()];

    Host::new(lifetime)
        .with_cancellation(runner.cancellation())
        .run(&services)
        .await
        .map_err(CliError::from)?;

    if let Some(ExecutionOutcome::Fault(err)) = runner.outcome() {
        eprintln!("{}", format!("Error: {:#}", err).red());
    }
    Ok(runner.exit_code())
}

/// Directory holding the settings files: next to the executable.
fn base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn setup_logging(default_level: &str) {
    tracing::debug!("INIT: Attempting logger init from main.rs");

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();
}
