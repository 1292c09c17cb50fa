use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tracing::{error, info};

use smart_order_router::api::create_router;
use smart_order_router::config::{init_logging, load_config};
use smart_order_router::models::state::AppState;
use smart_order_router::models::tokens::{TokenList, TokenRegistry};
use smart_order_router::services::chain::HttpRpcClient;
use smart_order_router::services::multicall::MulticallQuoter;
use smart_order_router::services::pool_provider::MulticallPoolProvider;
use smart_order_router::services::router::SwapRouter;
use smart_order_router::services::selection::CandidatePoolSelector;
use smart_order_router::services::subgraph::HttpSubgraphProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging();

    // Load configuration
    let config = load_config();
    config.routing.validate().map_err(|e| {
        error!("Invalid routing configuration: {}", e);
        anyhow::anyhow!("Invalid routing configuration: {}", e)
    })?;
    info!(chain_id = config.chain_id, "Initializing order router...");

    // Load tokens
    let registry = match &config.token_list_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read token list {}: {}", path, e))?;
            let list: TokenList = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("Failed to parse token list {}: {}", path, e))?;
            TokenRegistry::from_token_list(config.chain_id, list)
        }
        None => TokenRegistry::new(config.chain_id),
    };
    info!("Loaded {} tokens", registry.len());
    let registry = Arc::new(registry);

    // Wire providers. The RPC client is shared: it serves both contract
    // calls and the gas price oracle.
    let rpc = Arc::new(HttpRpcClient::new(config.rpc_url.clone()));
    let subgraph = Arc::new(HttpSubgraphProvider::new(config.subgraph_url.clone()));
    let pool_provider = Arc::new(MulticallPoolProvider::new(
        rpc.clone(),
        config.gas_limit_per_call,
    ));
    let quoter = Arc::new(MulticallQuoter::new(
        rpc.clone(),
        config.routing.multicall_chunk_size,
        config.gas_limit_per_call,
    ));
    let selector = CandidatePoolSelector::new(subgraph, pool_provider, registry.clone());
    let router = Arc::new(SwapRouter::new(
        config.chain_id,
        selector,
        quoter,
        rpc,
        config.routing,
    ));

    let app_state = AppState {
        router,
        registry,
        chain_id: config.chain_id,
    };

    // Create router and start server
    let app = create_router(app_state);

    // Parse the host into IpAddr
    let ip_addr: IpAddr = config.host.parse().expect("Invalid host address");
    let addr = SocketAddr::from((ip_addr, config.port));

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!("Failed to bind to address: {}", e);
        e
    })?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| {
            error!("Server error: {}", e);
            anyhow::anyhow!("Failed to start server: {}", e)
        })?;

    Ok(())
}
