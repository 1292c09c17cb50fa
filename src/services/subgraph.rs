use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::errors::RouterError;
use crate::models::pool::SubgraphPool;

/// Source of the pool universe snapshot. Queried once per request; the
/// snapshot is a ranking input only, never quote state.
#[async_trait]
pub trait SubgraphPoolProvider: Send + Sync {
    async fn get_pools(&self) -> Result<Vec<SubgraphPool>, RouterError>;
}

const PAGE_SIZE: usize = 1_000;
const MAX_PAGES: usize = 20;
/// Pools below this TVL are dust; paging stops once a TVL-descending page
/// drops under it.
const MIN_TVL_USD: f64 = 1.0;

const POOLS_QUERY: &str = r#"
query pools($pageSize: Int!, $skip: Int!) {
  pools(first: $pageSize, skip: $skip, orderBy: totalValueLockedUSD, orderDirection: desc) {
    id
    token0 { id symbol }
    token1 { id symbol }
    feeTier
    totalValueLockedUSD
  }
}
"#;

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<PoolsData>,
    errors: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct PoolsData {
    pools: Vec<SubgraphPool>,
}

/// GraphQL-over-HTTP implementation paging the universe in TVL-descending
/// windows.
pub struct HttpSubgraphProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpSubgraphProvider {
    pub fn new(url: String) -> Self {
        HttpSubgraphProvider {
            client: reqwest::Client::new(),
            url,
        }
    }

    async fn fetch_page(&self, skip: usize) -> Result<Vec<SubgraphPool>, RouterError> {
        let body = json!({
            "query": POOLS_QUERY,
            "variables": { "pageSize": PAGE_SIZE, "skip": skip },
        });
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RouterError::transport(format!("Subgraph request failed: {}", e)))?;
        let payload: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| RouterError::transport(format!("Subgraph bad response body: {}", e)))?;
        if let Some(errors) = payload.errors {
            return Err(RouterError::transport(format!(
                "Subgraph returned errors: {}",
                errors
            )));
        }
        payload
            .data
            .map(|data| data.pools)
            .ok_or_else(|| RouterError::transport("Subgraph response missing data"))
    }
}

#[async_trait]
impl SubgraphPoolProvider for HttpSubgraphProvider {
    async fn get_pools(&self) -> Result<Vec<SubgraphPool>, RouterError> {
        let mut pools: Vec<SubgraphPool> = Vec::new();
        for page in 0..MAX_PAGES {
            let batch = self.fetch_page(page * PAGE_SIZE).await?;
            let received = batch.len();
            let below_cutoff = batch
                .last()
                .map(|pool| pool.tvl_usd() < MIN_TVL_USD)
                .unwrap_or(true);
            pools.extend(batch);
            debug!(page, received, total = pools.len(), "Fetched subgraph page");
            if received < PAGE_SIZE || below_cutoff {
                break;
            }
        }
        info!("Fetched {} pools from subgraph", pools.len());
        Ok(pools)
    }
}
