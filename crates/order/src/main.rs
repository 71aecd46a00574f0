use anyhow::{Context, Result};
use order::{
    config::myconfig::Config, di::DependenciesInjectDeps, handler::AppRouter, state::AppState,
};
use shared::{config::ConnectionManager, utils::init_logger};
use sqlx::{Pool, Postgres};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let (config, state) = setup().await.context("Failed to setup application")?;

    AppRouter::serve(config.port, state)
        .await
        .context("HTTP server failed")?;

    info!("✅ Order service shutdown complete.");
    Ok(())
}

async fn setup() -> Result<(Config, AppState)> {
    dotenv::dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    init_logger("order-service", config.is_dev, config.enable_file_log);

    let db_pool = ConnectionManager::new_pool(
        &config.database_url,
        config.db_min_conn,
        config.db_max_conn,
    )
    .await
    .context("Failed to initialize database pool")?;

    if config.run_migrations {
        info!("🗂️ Running database migrations");
        run_migrations(&db_pool)
            .await
            .context("failed to migration database")?;
    }

    info!(
        "🔒 Order transactions run at isolation level {}",
        config.tx_isolation
    );

    let deps = DependenciesInjectDeps::postgres(db_pool, config.tx_isolation);
    let state = AppState::new(deps, &config.jwt_secret).await;

    info!("✅ Application setup completed successfully.");
    Ok((config, state))
}

pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;

    Ok(())
}
