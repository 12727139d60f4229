use std::sync::Arc;

use walletscope::api::router::create_router;
use walletscope::config::AppConfig;
use walletscope::ingestion::SignalCollector;
use walletscope::rpc::{HttpRpcClient, JsonRpc};
use walletscope::services::{ReportService, RequirementsStore};
use walletscope::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);

    let metrics_handle = walletscope::metrics::init_metrics();
    let addr = format!("{}:{}", config.host, config.port);

    let target: Arc<dyn JsonRpc> =
        Arc::new(HttpRpcClient::new(config.target_rpc_url.clone(), config.rpc_timeout)?);
    tracing::info!(
        host = AppConfig::redacted_host(&config.target_rpc_url),
        timeout_ms = config.rpc_timeout.as_millis() as u64,
        "Target-chain RPC configured"
    );

    let reference: Option<Arc<dyn JsonRpc>> = match &config.reference_rpc_url {
        Some(url) => {
            tracing::info!(
                host = AppConfig::redacted_host(url),
                "Reference-chain RPC configured"
            );
            Some(Arc::new(HttpRpcClient::new(url.clone(), config.rpc_timeout)?))
        }
        None => {
            tracing::warn!(
                "REFERENCE_RPC_URL is not set; reference-chain transaction counts will be reported as unavailable"
            );
            None
        }
    };

    let collector = SignalCollector::new(target, reference, config.collector_config());
    let requirements = RequirementsStore::new(config.requirements.clone());

    tracing::info!(
        requirements = ?config.requirements,
        fallback = %config.first_activity_fallback,
        log_window = config.log_window_blocks,
        "Eligibility pipeline ready"
    );

    let state = AppState {
        reports: ReportService::new(collector, requirements, config.token_symbol.clone()),
        metrics_handle,
        api_token: config.api_token.as_deref().map(Arc::from),
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
