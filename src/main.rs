//! Tasklist server binary
//!
//! Loads configuration, connects to PostgreSQL, runs migrations, and
//! serves the application.
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/tasklist \
//! SESSION_SECRET=$(openssl rand -hex 32) \
//! cargo run
//! ```

use tasklist::{
    app::{build_router, AppState},
    config::Config,
    db::{migrations, pool},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasklist=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("tasklist v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let db = pool::create_pool(&config.database).await?;
    migrations::run_migrations(&db).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("listening on http://{}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
