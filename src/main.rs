//! local-library server entry point.

use clap::Parser;
use local_library::{
    config::{Backend, Cli, Command, Config},
    db::{self, Database},
    seed, server,
};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "local_library=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Find or load config
    let config_path = cli.config.clone().or_else(Config::find_config_file);

    let config = if let Some(ref path) = config_path {
        tracing::debug!(path = %path.display(), "Loading config");
        Config::load(path)?
    } else {
        Config::default()
    };

    // Handle command
    match cli.command {
        Some(Command::Init { force }) => cmd_init(force),
        Some(Command::Seed { force }) => cmd_seed(&config, force),
        Some(Command::Serve { bind, backend }) => cmd_serve(config, bind, backend).await,
        None => {
            // Default: start server
            cmd_serve(config, None, None).await
        }
    }
}

/// Initialize config and database.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let config_path = PathBuf::from("config.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    // Write default config
    std::fs::write(&config_path, Config::generate_default())?;
    println!("Created config file: {}", config_path.display());

    // Initialize database and upload directory
    let config = Config::default();
    let _db = Database::open(&config.database.path)?;
    println!("Initialized database: {}", config.database.path.display());

    std::fs::create_dir_all(&config.uploads.dir)?;
    println!("Created upload directory: {}", config.uploads.dir.display());

    println!("\nEdit config.toml to configure your server.");
    println!("Then run: local-library seed   (optional sample data)");
    println!("And:      local-library serve");

    Ok(())
}

/// Load the sample catalog.
fn cmd_seed(config: &Config, force: bool) -> anyhow::Result<()> {
    if config.database.backend == Backend::Memory {
        anyhow::bail!("The memory backend does not persist; seed data is lost on exit");
    }

    let store = db::open_store(&config.database)?;
    let summary = seed::seed(store.as_ref(), force)?;

    println!(
        "Seeded {} authors, {} genres, {} books and {} copies into {}",
        summary.authors,
        summary.genres,
        summary.books,
        summary.instances,
        config.database.path.display()
    );

    Ok(())
}

/// Start the server.
async fn cmd_serve(
    mut config: Config,
    bind: Option<std::net::SocketAddr>,
    backend: Option<Backend>,
) -> anyhow::Result<()> {
    // Override config values if specified
    if let Some(addr) = bind {
        config.server.bind = addr;
    }
    if let Some(backend) = backend {
        config.database.backend = backend;
    }

    tracing::info!(
        bind = %config.server.bind,
        backend = %config.database.backend,
        uploads = %config.uploads.dir.display(),
        "Starting local-library server"
    );

    // A store that cannot be opened is fatal
    let store = db::open_store(&config.database)?;
    if db::is_empty(store.as_ref())? {
        tracing::info!("Catalog is empty. Load sample data with: local-library seed");
    }

    tokio::fs::create_dir_all(&config.uploads.dir).await?;

    let bind = config.server.bind;
    let state = server::AppState::new(config, store)?;
    let app = server::create_router(state);

    let listener = TcpListener::bind(bind).await?;
    tracing::info!(address = %bind, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
