use anyhow::{Context, Result};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use carmarket_search::{
    config::Settings, routes, store::AppwriteStore, AppState, CarSearchService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "carmarket_search=info,tower_http=info".into()))
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing car search server...");

    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    let shared_settings = Arc::new(settings);

    // The one store client for the whole process, handed to the service
    let store = AppwriteStore::new(&shared_settings.store).context("Failed to set up document store client")?;
    let search = CarSearchService::new(
        Arc::new(store),
        shared_settings.store.collection_id.clone(),
        shared_settings.search,
    );
    tracing::info!(
        collection = %shared_settings.store.collection_id,
        endpoint = %shared_settings.store.endpoint,
        "Document store client created."
    );

    let app_state = AppState { search: Arc::new(search) };

    let app = routes::create_router(app_state);

    let addr: SocketAddr = shared_settings.server_address.parse().with_context(|| {
        format!("Invalid server address format: {}", shared_settings.server_address)
    })?;

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
