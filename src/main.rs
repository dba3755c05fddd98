mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::database;
use crate::core::router::{create_router, AppServices, Repositories};
use crate::features::auth::repositories::{PgTokenBlacklistRepository, PgUserRepository};
use crate::features::files::repositories::PgFileRepository;
use crate::features::folders::repositories::PgFolderRepository;
use crate::features::shared_files::repositories::PgSharedFileRepository;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, storage_backend={:?}, pid={}",
        worker_threads,
        config.storage.backend,
        std::process::id()
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    let storage = crate::modules::storage::from_config(&config.storage)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize object storage: {}", e))?;
    tracing::info!("Object storage initialized ({})", storage.name());

    let repositories = Repositories {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        token_blacklist: Arc::new(PgTokenBlacklistRepository::new(pool.clone())),
        folders: Arc::new(PgFolderRepository::new(pool.clone())),
        files: Arc::new(PgFileRepository::new(pool.clone())),
        shared_files: Arc::new(PgSharedFileRepository::new(pool.clone())),
    };

    let services = AppServices::build(repositories, storage, &config.auth)
        .map_err(|e| anyhow::anyhow!("Failed to initialize services: {}", e))?;
    tracing::info!("Services initialized");

    let app = create_router(services, &config);

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
