use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use story_author::{
    cli::{execute_record_command, Cli, Commands},
    config::{Config, LogFormat, StorageBackend},
    records::RecordService,
    storage::{FileSnapshotStore, SnapshotStore, SqliteStorage},
    AuthoringSession, SessionEnd, Story,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "Story Author starting...");

    match cli.command {
        Some(Commands::Records { kind, op }) => {
            let storage = SqliteStorage::new(&config.database).await?;
            info!(path = %config.database.path.display(), "Database initialized");

            let result = execute_record_command(kind, op, &RecordService::new(storage)).await;
            if result.exit_code == 0 {
                println!("{}", result.message);
            } else {
                eprintln!("{}", result.message);
                std::process::exit(result.exit_code);
            }
        }
        Some(Commands::Author {
            file,
            backend,
            load,
        }) => {
            if let Some(file) = file {
                config.storage.snapshot_path = file;
            }
            if let Some(backend) = backend {
                config.storage.backend = backend;
            }
            config.session.load_on_start |= load;
            run_session(&config).await?;
        }
        None => run_session(&config).await?,
    }

    Ok(())
}

/// Run an authoring session on stdin/stdout.
async fn run_session(config: &Config) -> anyhow::Result<()> {
    let store: Box<dyn SnapshotStore> = match config.storage.backend {
        StorageBackend::File => {
            info!(path = %config.storage.snapshot_path.display(), "Using snapshot file");
            Box::new(FileSnapshotStore::new(&config.storage.snapshot_path))
        }
        StorageBackend::Sqlite => {
            let storage = SqliteStorage::new(&config.database).await.map_err(|e| {
                error!(error = %e, "Failed to initialize database");
                e
            })?;
            info!(path = %config.database.path.display(), "Using snapshot database");
            Box::new(storage)
        }
    };

    let mut session = AuthoringSession::new(
        Story::new(),
        store,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );

    if config.session.load_on_start {
        if let Err(e) = session.load().await {
            warn!(error = %e, "Could not load stored story, starting empty");
        }
    }

    match session.run().await? {
        SessionEnd::Saved => info!("Session complete"),
        SessionEnd::InputClosed => warn!("Session ended without saving"),
        SessionEnd::SaveFailed => {
            error!("Session ended but the story was not saved");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
