use std::sync::Arc;

use dotenv::dotenv;
use posting_backend::{config::settings::Settings, router, store::PgStore, AppState};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new()?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;

    info!("database connected");

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("migrations applied");

    let app_state = AppState::new(Arc::new(PgStore::new(pool)), settings.clone());
    let app = router(app_state);

    info!("Server running on http://localhost:{}", settings.port);

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
