//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without the workspace runner.
//!
//! ## Intended use
//! Useful during development when only the HTTP surface (with OpenAPI/Swagger UI) is needed.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use extract_core::{
    extension_from_env_value, namespace_from_env_value, CoreConfig, ExtractionService,
};

/// Main entry point for the REST API server
///
/// # Environment Variables
/// - `FHIR_EXTRACT_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `FHIR_EXTRACT_NAMESPACE`: FHIR namespace URI, or `*` to match local names only
/// - `FHIR_EXTRACT_EXTENSION`: input document extension (default: "xml")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("extract_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("FHIR_EXTRACT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let namespace = namespace_from_env_value(std::env::var("FHIR_EXTRACT_NAMESPACE").ok());
    let extension = extension_from_env_value(std::env::var("FHIR_EXTRACT_EXTENSION").ok());
    let cfg = CoreConfig::new(namespace, &extension)?;

    tracing::info!("-- Starting FHIR extract REST API on {}", addr);

    let app = router(AppState::new(ExtractionService::new(cfg)));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
