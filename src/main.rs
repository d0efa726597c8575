use std::sync::Arc;

use workforce_tour::config::{ServerConfig, TourConfig};
use workforce_tour::error::Result;
use workforce_tour::routes::{StatusStore, flow_routes, status_routes};
use workforce_tour::tour::{FlowRegistry, PageId};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let server = ServerConfig::from_env();
    let tour = TourConfig::from_env()?;

    // Custom flow definitions must parse before the server comes up.
    let mut flows = FlowRegistry::builtin();
    if let Ok(path) = std::env::var("WORKFORCE_TOUR_FLOWS") {
        let json = tokio::fs::read_to_string(&path).await?;
        flows.merge(FlowRegistry::from_json(&json)?);
        tracing::info!(path = %path, "Loaded custom tour flows");
    }
    for page in PageId::KNOWN {
        let steps = flows.get_flow(page).map(|f| f.len()).unwrap_or(0);
        tracing::info!(page = %page, steps, "Tour flow");
    }

    eprintln!("🧭 Workforce Tour v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Status API: http://0.0.0.0:{}/api/onboarding/status", server.port);
    eprintln!("   Flows API:  http://0.0.0.0:{}/api/onboarding/flows/{{page}}", server.port);
    eprintln!("   Status timeout: {:?}", tour.status_timeout);

    let app = status_routes(StatusStore::new()).merge(flow_routes(Arc::new(flows)));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server.port)).await?;
    tracing::info!(port = server.port, "Status server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
