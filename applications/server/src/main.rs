/// Identity Manager Server - users, groups and memberships over HTTP
use clap::{Parser, Subcommand};
use im_server::{
    config::ServerConfig, create_router, services::BcryptPasswordHasher, state::AppState,
};
use im_storage::SqliteIdentityStore;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "im-server")]
#[command(about = "Identity manager HTTP server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long, env = "IM_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the default configuration as TOML
    GenConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "im_server=info,im_storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(config).await?;
        }
        Commands::GenConfig => {
            print!("{}", ServerConfig::default().to_toml()?);
        }
    }

    Ok(())
}

async fn serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load(config_path.as_deref())?;
    config.validate()?;

    tracing::info!("Starting Identity Manager Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    if let Some(machine_id) = config.ids.machine_id {
        if !im_core::idgen::set_machine_id(machine_id) {
            tracing::warn!("Machine id was already fixed, ignoring {}", machine_id);
        }
    }
    tracing::info!("Id generator machine id: {}", im_core::idgen::machine_id());

    // Initialize database
    let pool = im_storage::create_pool(
        &config.storage.database_url,
        config.storage.max_connections,
    )
    .await?;
    im_storage::run_migrations(&pool).await?;
    tracing::info!("Database connected");

    let hasher = BcryptPasswordHasher::new(config.auth.bcrypt_cost);
    let store = SqliteIdentityStore::new(pool, Arc::new(hasher));

    // Build application state
    let app_state = AppState::new(Arc::new(store));

    // Build router
    let app = create_router(app_state);

    // Create server address
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
