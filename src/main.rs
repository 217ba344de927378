use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitlink::adapters::{EventBus, InMemoryPlatform};
use fitlink::application::FitnessBridge;
use fitlink::config::Config;
use fitlink::interface::http::create_router;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("fitlink={},tower_http=info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting fitlink v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    // Platform handle shared by every adapter
    let platform = Arc::new(InMemoryPlatform::new());
    info!("✓ Using in-memory fitness platform");

    let events = EventBus::with_capacity(config.event_buffer);
    let bridge = Arc::new(FitnessBridge::new(
        platform,
        Arc::new(events.clone()),
        config.bridge_settings()?,
    ));

    info!("✓ Bridge initialized for {}", bridge.settings().app_package_name);

    // Create HTTP server
    let app = create_router(bridge, events);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("✓ fitlink listening on {}", addr);
    info!("  → History: http://localhost:{}/api/history/height", config.port);
    info!("  → Events: http://localhost:{}/api/events", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
