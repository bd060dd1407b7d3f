use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use extract_core::{
    CoreConfig, ExtractionService, extension_from_env_value, namespace_from_env_value,
};

/// Main entry point for the FHIR extract service
///
/// Resolves configuration once, then serves the REST API until interrupted.
///
/// # Environment Variables
/// - `FHIR_EXTRACT_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `FHIR_EXTRACT_NAMESPACE`: FHIR namespace URI (default: "http://hl7.org/fhir"; `*` matches
///   elements by local name only)
/// - `FHIR_EXTRACT_EXTENSION`: input document extension (default: "xml")
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, startup or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fhir_extract_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("extract_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("FHIR_EXTRACT_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;
    let namespace = namespace_from_env_value(std::env::var("FHIR_EXTRACT_NAMESPACE").ok());
    let extension = extension_from_env_value(std::env::var("FHIR_EXTRACT_EXTENSION").ok());
    let cfg = CoreConfig::new(namespace, &extension)?;

    tracing::info!("++ Starting FHIR extract REST on {}", rest_addr);
    tracing::info!(
        "++ Matching namespace {:?}, extension .{}",
        cfg.namespace(),
        cfg.document_extension()
    );

    let app = router(AppState::new(ExtractionService::new(cfg)));
    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down");
        })
        .await?;

    Ok(())
}
