//! Looks up a token's displayed address and standard on a block explorer
//! page and answers with a small JSON document.

pub mod answer;
pub mod config;
pub mod errors;
pub mod explorer;
pub mod extract;
pub mod input;
pub mod routes;
pub mod setup;
pub mod state;

pub use answer::Answer;
pub use config::Config;
pub use errors::LookupError;
pub use state::AppState;

/// Serves the lookup router on `listener` until `shutdown` resolves.
pub async fn run_server(
    listener: tokio::net::TcpListener,
    app_state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> color_eyre::Result<()> {
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, routes::routes(app_state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
