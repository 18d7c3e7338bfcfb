use std::sync::Arc;

use gasdepot_store::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gasdepot_observability::init();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        tracing::warn!("DATABASE_URL not set; using local dev default");
        "postgres://localhost/gasdepot".to_string()
    });
    let store = PgStore::connect(&database_url).await?;

    let app = gasdepot_api::app::build_app(Arc::new(store));

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
