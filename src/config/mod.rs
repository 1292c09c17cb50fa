mod logging;
pub use logging::init_logging;

use crate::errors::RouterError;

/// Routing knobs recognised by the pipeline. Defaults match the deployed
/// router; `validate` runs on request entry so a bad override fails the
/// request instead of the process.
#[derive(Debug, Clone, Copy)]
pub struct RoutingConfig {
    /// Overall TVL-ranked candidate pools.
    pub top_n: usize,
    /// TVL-ranked candidates touching each trade endpoint.
    pub top_n_token_in_out: usize,
    /// Second-hop candidates per seed pool.
    pub top_n_second_hop: usize,
    /// Path-length cap for route enumeration.
    pub max_swaps_per_path: usize,
    /// Split-count cap. Anything above 3 is rejected.
    pub max_splits: usize,
    /// Amount granularity in percent; must divide 100.
    pub distribution_percent: u32,
    /// Number of quote calls bundled per aggregator submission.
    pub multicall_chunk_size: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        RoutingConfig {
            top_n: 4,
            top_n_token_in_out: 4,
            top_n_second_hop: 2,
            max_swaps_per_path: 3,
            max_splits: 3,
            distribution_percent: 5,
            multicall_chunk_size: 50,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), RouterError> {
        if self.max_splits > 3 {
            return Err(RouterError::config(format!(
                "maxSplits {} is unsupported; the split search is capped at 3",
                self.max_splits
            )));
        }
        if self.max_splits == 0 {
            return Err(RouterError::config("maxSplits must be >= 1"));
        }
        if self.distribution_percent == 0 || 100 % self.distribution_percent != 0 {
            return Err(RouterError::config(format!(
                "distributionPercent {} must divide 100 evenly",
                self.distribution_percent
            )));
        }
        if self.max_swaps_per_path == 0 {
            return Err(RouterError::config("maxSwapsPerPath must be >= 1"));
        }
        if self.multicall_chunk_size == 0 {
            return Err(RouterError::config("multicallChunkSize must be >= 1"));
        }
        Ok(())
    }
}

pub fn load_config() -> AppConfig {
    dotenv::dotenv().ok();

    let rpc_url = std::env::var("RPC_URL").expect("RPC_URL must be set");
    let subgraph_url = std::env::var("SUBGRAPH_URL").expect("SUBGRAPH_URL must be set");
    let chain_id: u64 = std::env::var("CHAIN_ID")
        .unwrap_or_else(|_| "1".to_string())
        .parse()
        .expect("Invalid CHAIN_ID");
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .expect("Invalid PORT");
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let _ = host.parse::<std::net::IpAddr>().expect("Invalid HOST");

    let token_list_path = std::env::var("TOKEN_LIST_PATH").ok();

    let gas_limit_per_call: u64 = std::env::var("QUOTE_GAS_LIMIT_PER_CALL")
        .unwrap_or_else(|_| "1000000".to_string())
        .parse()
        .expect("Invalid QUOTE_GAS_LIMIT_PER_CALL");
    assert!(gas_limit_per_call > 0, "QUOTE_GAS_LIMIT_PER_CALL must be > 0");

    let mut routing = RoutingConfig::default();
    if let Ok(value) = std::env::var("TOP_N") {
        routing.top_n = value.parse().expect("Invalid TOP_N");
    }
    if let Ok(value) = std::env::var("TOP_N_TOKEN_IN_OUT") {
        routing.top_n_token_in_out = value.parse().expect("Invalid TOP_N_TOKEN_IN_OUT");
    }
    if let Ok(value) = std::env::var("TOP_N_SECOND_HOP") {
        routing.top_n_second_hop = value.parse().expect("Invalid TOP_N_SECOND_HOP");
    }
    if let Ok(value) = std::env::var("MAX_SWAPS_PER_PATH") {
        routing.max_swaps_per_path = value.parse().expect("Invalid MAX_SWAPS_PER_PATH");
    }
    if let Ok(value) = std::env::var("MAX_SPLITS") {
        routing.max_splits = value.parse().expect("Invalid MAX_SPLITS");
    }
    if let Ok(value) = std::env::var("DISTRIBUTION_PERCENT") {
        routing.distribution_percent = value.parse().expect("Invalid DISTRIBUTION_PERCENT");
    }
    if let Ok(value) = std::env::var("MULTICALL_CHUNK_SIZE") {
        routing.multicall_chunk_size = value.parse().expect("Invalid MULTICALL_CHUNK_SIZE");
    }

    AppConfig {
        rpc_url,
        subgraph_url,
        chain_id,
        host,
        port,
        token_list_path,
        gas_limit_per_call,
        routing,
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub rpc_url: String,
    pub subgraph_url: String,
    pub chain_id: u64,
    pub host: String,
    pub port: u16,
    pub token_list_path: Option<String>,
    pub gas_limit_per_call: u64,
    pub routing: RoutingConfig,
}
