//! Catalog server command.

use std::path::Path;

use rocketshoes_storefront::catalog::{Catalog, CatalogState, router};
use rocketshoes_storefront::config::CartConfig;

use super::CommandError;

/// Serve products and stock from `path` until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the address cannot be bound.
pub async fn catalog(config: &CartConfig, path: &Path) -> Result<(), CommandError> {
    let catalog = Catalog::load(path)?;
    tracing::info!(
        products = catalog.products.len(),
        stock_entries = catalog.stock.len(),
        "Loaded catalog from {}",
        path.display()
    );

    let app = router(CatalogState::new(catalog));

    let addr = config.catalog.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("catalog listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
