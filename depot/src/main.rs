use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use depot::api;
use depot::config::Config;
use depot::utils::cli::Args;
use depot::utils::state::AppState;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = validate_config(&args).await;

    let state = Arc::new(AppState::new(config.clone()));
    state.storage.bootstrap(config.clean_on_start).await?;

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port))
        .await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        root = %config.root_dir.display(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down");
}

async fn validate_config(args: &Args) -> Config {
    let mut validation_errors = Vec::new();

    let root_dir = Path::new(&args.root);
    if let Ok(meta) = tokio::fs::metadata(root_dir).await {
        if !meta.is_dir() {
            validation_errors.push(format!(
                "DEPOT_ROOTDIR `{}` exists but is not a directory",
                args.root,
            ));
        }
    }

    if args.max_chunk_bytes <= depot::domain::CHUNK_HEADER_SIZE {
        validation_errors.push(format!(
            "DEPOT_MAX_CHUNK_BYTES `{}` cannot hold a chunk header and payload",
            args.max_chunk_bytes,
        ));
    }

    let jwt_secret = env_or_default("JWT_SECRET", "secret");
    let jwt_lifetime_secs = env_or_default("JWT_LIFETIME_SECONDS", "3600");
    let jwt_lifetime_secs = match jwt_lifetime_secs.parse::<i64>() {
        Ok(secs) if secs > 0 => secs,
        _ => {
            validation_errors.push(format!(
                "JWT_LIFETIME_SECONDS `{jwt_lifetime_secs}` is not a positive integer",
            ));
            0
        }
    };
    let admin_username = env_or_default("DEPOT_ADMIN_USERNAME", "admin");
    let admin_password = env_or_default("DEPOT_ADMIN_PASSWORD", "secret");

    if !validation_errors.is_empty() {
        eprintln!("{}", validation_errors.join("\n"));
        std::process::exit(1);
    }

    Config {
        host: args.host.clone(),
        port: args.port,
        root_dir: PathBuf::from(&args.root),
        max_chunk_bytes: args.max_chunk_bytes,
        clean_on_start: args.clean_on_start,
        jwt_secret,
        jwt_lifetime_secs,
        admin_username,
        admin_password,
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        tracing::warn!("{key} is not set. Use default value: `{default}`");
        default.to_string()
    })
}
