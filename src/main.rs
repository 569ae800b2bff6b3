//! Card Generator - placeholder card images over HTTP.
//!
//! This binary starts the HTTP server or renders a single card from the
//! command line.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardgen::{
    card::{spawn_expiry_sweeper, validate_card_request, CardRenderer, MemoryCardStore, Render},
    config::{Cli, Command, RenderConfig, ServeConfig},
    server::{create_router, RouterConfig},
    CardService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Render(config) => run_render(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose || config.debug_enabled());

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let addr = config.bind_address();
    let settings = config.into_settings();

    print_banner();

    info!("Configuration:");
    if settings.debug {
        warn!("  Debug: ON - error details are exposed in responses");
        warn!("         Disable for production: DEBUG=off");
    } else {
        info!("  Debug: off");
    }
    info!("  Allowed hosts: {}", settings.allowed_hosts.patterns().join(", "));
    info!(
        "  Cache: {}s TTL, {}MB capacity, sweep every {}s",
        settings.cache_ttl.as_secs(),
        settings.cache_capacity / (1024 * 1024),
        settings.cache_sweep_interval.as_secs()
    );
    if settings.secret_key_generated {
        warn!("  Secret key: generated for this process (set SECRET_KEY to keep it across restarts)");
    }

    let store = Arc::new(MemoryCardStore::with_capacity(settings.cache_capacity));
    let sweeper = spawn_expiry_sweeper(Arc::clone(&store), settings.cache_sweep_interval);

    let card_service = CardService::with_shared_store(CardRenderer::new(), store)
        .with_ttl(settings.cache_ttl);

    let router = create_router(card_service, RouterConfig::from_settings(&settings));

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl -o card.png http://{}/card/320x200/", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            sweeper.abort();
            return ExitCode::FAILURE;
        }
    };

    let result = axum::serve(listener, router).await;
    sweeper.abort();

    if let Err(e) = result {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Print the startup banner.
fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    info!("");
    info!(" ██████╗ █████╗ ██████╗ ██████╗  ██████╗ ███████╗███╗   ██╗");
    info!("██╔════╝██╔══██╗██╔══██╗██╔══██╗██╔════╝ ██╔════╝████╗  ██║");
    info!("██║     ███████║██████╔╝██║  ██║██║  ███╗█████╗  ██╔██╗ ██║");
    info!("██║     ██╔══██║██╔══██╗██║  ██║██║   ██║██╔══╝  ██║╚██╗██║");
    info!("╚██████╗██║  ██║██║  ██║██████╔╝╚██████╔╝███████╗██║ ╚████║");
    info!(" ╚═════╝╚═╝  ╚═╝╚═╝  ╚═╝╚═════╝  ╚═════╝ ╚══════╝╚═╝  ╚═══╝");
    info!("");
    info!("                          v{}", version);
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "cardgen=debug,tower_http=debug"
    } else {
        "cardgen=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// =============================================================================
// Render Command
// =============================================================================

fn run_render(config: RenderConfig) -> ExitCode {
    let request = match validate_card_request(Some(&config.height), Some(&config.width)) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error: invalid card request: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let data = match CardRenderer::new().render(&request, config.format) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match config.output_path(request.height(), request.width()) {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &data) {
                eprintln!("Error: failed to write {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
            eprintln!(
                "Wrote {} X {} {} card ({} bytes) to {}",
                request.height(),
                request.width(),
                config.format,
                data.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(&data).and_then(|_| stdout.flush()) {
                eprintln!("Error: failed to write card to stdout: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
