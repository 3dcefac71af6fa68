use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aliven_core::config::export_config_from_lookup;
use aliven_core::PdfExporter;
use api_rest::AppState;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("-- Shutting down Aliven REST");
}

/// Main entry point for the Aliven application
///
/// Starts the REST server, which serves the path catalog, draft handoff previews and the PDF
/// export endpoint.
///
/// # Environment Variables
/// - `ALIVEN_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `ALIVEN_DEPLOYMENT_MODE`: `local` or `hosted` (default: `local`)
/// - `ALIVEN_CHROMIUM_PATH`: serverless chromium binary used in hosted mode
/// - `ALIVEN_LOCAL_CHROME_PATH`: Chrome installation used in local mode
/// - `ALIVEN_BROWSER_ARGS`: extra whitespace-separated browser flags
/// - `ALIVEN_LOGO_PATH`: branding image embedded in exports
/// - `ALIVEN_LAUNCH_TIMEOUT_SECS`: browser launch timeout in seconds
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aliven=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("ALIVEN_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let config = export_config_from_lookup(|name| std::env::var(name).ok())?;

    let logo = config.logo_path();
    if !logo.is_file() {
        tracing::warn!(
            "branding logo not found at {}, exports will render without it",
            logo.display()
        );
    }

    let provider = aliven_browser::provider_for(&config);
    tracing::info!(
        "++ Export mode {} using {} provider",
        config.deployment_mode(),
        provider.name()
    );

    let app = api_rest::router(AppState::new(PdfExporter::from_config(&config, provider)));

    tracing::info!("++ Starting Aliven REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
