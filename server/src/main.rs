//! Recipe API server: reads config from the environment (and `.env`), picks the
//! PostgreSQL or in-memory store, optionally connects the S3 media host, and serves.
//!
//! Run from repo root: `cargo run -p recipe-server`

use recipe_api::{
    app, ensure_database_exists, ensure_recipe_table, telemetry, AppConfig, AppState, MediaHost,
    MemoryRecipeStore, PgRecipeStore, RecipeStore, S3MediaHost,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn RecipeStore> = match &config.database {
        Some(db) => {
            ensure_database_exists(&db.url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(db.max_connections)
                .connect(&db.url)
                .await?;
            ensure_recipe_table(&pool).await?;
            tracing::info!("using PostgreSQL store");
            Arc::new(PgRecipeStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; recipes are kept in memory and lost on restart");
            Arc::new(MemoryRecipeStore::new())
        }
    };

    let media: Option<Arc<dyn MediaHost>> = match &config.media {
        Some(media) => {
            tracing::info!(bucket = %media.bucket, base = %media.public_base_url(), "image uploads enabled");
            Some(Arc::new(S3MediaHost::new(media).await))
        }
        None => {
            tracing::info!("media credentials not set; image uploads disabled");
            None
        }
    };

    let router = app(AppState::new(store, media), config.server.max_upload_bytes);
    let listener = TcpListener::bind(config.server.bind_addr()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
