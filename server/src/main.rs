use etherscan_parse::{
    run_server,
    setup::{setup_sentry, setup_tracing},
    AppState, Config,
};
use tracing::info;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let _sentry_guard = setup_sentry();

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?
        .block_on(async { run_application().await })
}

async fn run_application() -> color_eyre::Result<()> {
    setup_tracing("etherscan_parse")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        built = env!("VERGEN_BUILD_TIMESTAMP"),
        rustc = env!("VERGEN_RUSTC_SEMVER"),
        "Starting etherscan-parse"
    );

    let config = Config::from_env()?;
    let app_state = AppState::from_config(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr()?).await?;

    run_server(listener, app_state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
