/// Chirp Server - microblogging HTTP API
use chirp_server::{
    config::ServerConfig,
    create_router,
    services::{
        users::{self, RegisterRequest},
        AuthService,
    },
    state::AppState,
};
use chirp_storage::Database;
use clap::{Parser, Subcommand};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chirp-server")]
#[command(about = "Chirp microblogging server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CHIRP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create an active, verified user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
        /// Grant superuser rights
        #[arg(long)]
        superuser: bool,
    },
    /// List all users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chirp_server=info,chirp_storage=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            serve(config).await?;
        }
        Commands::AddUser {
            username,
            email,
            password,
            superuser,
        } => {
            add_user(config, username, email, password, superuser).await?;
        }
        Commands::ListUsers => {
            list_users(config).await?;
        }
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    tracing::info!("Starting Chirp Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let db = Arc::new(open_database(&config).await?);
    tracing::info!("Database connected");

    let auth_service = Arc::new(AuthService::from_settings(&config.auth));
    tracing::info!("Auth service initialized");

    let app = create_router(AppState::new(db, auth_service));

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

async fn add_user(
    config: ServerConfig,
    username: String,
    email: String,
    password: String,
    superuser: bool,
) -> anyhow::Result<()> {
    config.validate()?;

    let db = open_database(&config).await?;
    let auth_service = AuthService::from_settings(&config.auth);

    let mut tx = db.begin().await?;
    let user = users::create_account(
        &mut tx,
        &auth_service,
        RegisterRequest {
            email,
            username,
            password,
        },
        superuser,
        true,
    )
    .await?;
    tx.commit().await?;

    println!("Created user {} ({}) <{}>", user.username, user.id, user.email);

    Ok(())
}

async fn list_users(config: ServerConfig) -> anyhow::Result<()> {
    let db = open_database(&config).await?;
    let mut conn = db.pool().acquire().await?;

    let all = chirp_storage::users::get_all(&mut conn).await?;

    println!("Users:");
    for user in all {
        let mut flags = Vec::new();
        if user.is_superuser {
            flags.push("superuser");
        }
        if !user.is_active {
            flags.push("inactive");
        }
        if !user.is_verified {
            flags.push("unverified");
        }
        println!(
            "  {} - {} <{}> {}",
            user.id,
            user.username,
            user.email,
            flags.join(",")
        );
    }

    Ok(())
}

/// Connect to the configured database, creating the parent directory of a
/// file-backed URL first
async fn open_database(config: &ServerConfig) -> anyhow::Result<Database> {
    let url = &config.storage.database_url;
    if let Some(path) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .map(|rest| rest.split('?').next().unwrap_or(rest))
        .filter(|path| !path.is_empty() && *path != ":memory:")
    {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }

    Ok(Database::connect(url).await?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
