//! Serves the in-memory registry until Ctrl-C.
use crate::config::ServerConfig;
use anyhow::Context;
use tonic::transport::Server;
use user_service::{FILE_DESCRIPTOR_SET, InMemoryUserRegistry, UserRegistryServer};

pub async fn serve(config: &ServerConfig) -> anyhow::Result<()> {
    let registry = UserRegistryServer::new(InMemoryUserRegistry::new());

    let reflection = if config.reflection {
        let service = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .context("Failed to build the reflection service")?;
        Some(service)
    } else {
        None
    };

    tracing::info!(
        addr = %config.addr,
        reflection = config.reflection,
        "User registry listening"
    );

    Server::builder()
        .add_service(registry)
        .add_optional_service(reflection)
        .serve_with_shutdown(config.addr, shutdown_signal())
        .await
        .with_context(|| format!("Server on {} stopped unexpectedly", config.addr))?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl-C received, shutting down"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await
        }
    }
}
