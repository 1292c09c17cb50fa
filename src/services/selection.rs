use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{debug, info};

use crate::config::RoutingConfig;
use crate::errors::RouterError;
use crate::models::pool::{FeeTier, SubgraphPool};
use crate::models::route::TradeType;
use crate::models::tokens::{wrapped_native, Token, TokenRegistry};
use crate::services::pool_provider::{PoolAccessor, PoolStateProvider};
use crate::services::subgraph::SubgraphPoolProvider;

/// The candidate pools grouped by the heuristic that picked them. Slices
/// are disjoint; the bridge slice is consumed again by gas costing.
#[derive(Debug, Default)]
pub struct PoolsBySelection {
    pub top_direct: Vec<SubgraphPool>,
    pub top_native_quote: Vec<SubgraphPool>,
    pub top_by_tvl: Vec<SubgraphPool>,
    pub top_by_tvl_token_in: Vec<SubgraphPool>,
    pub top_by_tvl_token_out: Vec<SubgraphPool>,
    pub token_in_second_hops: Vec<SubgraphPool>,
    pub token_out_second_hops: Vec<SubgraphPool>,
}

impl PoolsBySelection {
    pub fn total(&self) -> usize {
        self.top_direct.len()
            + self.top_native_quote.len()
            + self.top_by_tvl.len()
            + self.top_by_tvl_token_in.len()
            + self.top_by_tvl_token_out.len()
            + self.token_in_second_hops.len()
            + self.token_out_second_hops.len()
    }
}

/// Filters the pool universe down to a bounded TVL-ranked candidate set
/// and hydrates it on-chain.
pub struct CandidatePoolSelector {
    subgraph: Arc<dyn SubgraphPoolProvider>,
    pool_provider: Arc<dyn PoolStateProvider>,
    registry: Arc<TokenRegistry>,
}

fn address_key(token: &Token) -> String {
    format!("{:#x}", token.address)
}

fn touches(pool: &SubgraphPool, address: &str) -> bool {
    pool.token0.id == address || pool.token1.id == address
}

impl CandidatePoolSelector {
    pub fn new(
        subgraph: Arc<dyn SubgraphPoolProvider>,
        pool_provider: Arc<dyn PoolStateProvider>,
        registry: Arc<TokenRegistry>,
    ) -> Self {
        CandidatePoolSelector {
            subgraph,
            pool_provider,
            registry,
        }
    }

    pub async fn select(
        &self,
        token_in: &Token,
        token_out: &Token,
        trade_type: TradeType,
        cfg: &RoutingConfig,
        block: Option<u64>,
    ) -> Result<(PoolAccessor, PoolsBySelection), RouterError> {
        let universe = self.subgraph.get_pools().await?;
        let universe_size = universe.len();

        // Only pools whose tokens are both in the registry can be routed
        // through; everything else is unquotable noise.
        let mut pools: Vec<SubgraphPool> = universe
            .into_iter()
            .filter(|pool| self.known_token(&pool.token0.id) && self.known_token(&pool.token1.id))
            .collect();
        pools.sort_by(|a, b| {
            b.tvl_usd()
                .partial_cmp(&a.tvl_usd())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        debug!(
            universe = universe_size,
            eligible = pools.len(),
            "Filtered pool universe against token registry"
        );

        let in_key = address_key(token_in);
        let out_key = address_key(token_out);
        let mut chosen: HashSet<String> = HashSet::new();

        let top_direct: Vec<SubgraphPool> = pools
            .iter()
            .filter(|pool| touches(pool, &in_key) && touches(pool, &out_key))
            .take(2)
            .cloned()
            .collect();
        mark(&mut chosen, &top_direct);

        let top_native_quote =
            self.native_quote_slice(&pools, &chosen, token_in, token_out, trade_type);
        mark(&mut chosen, &top_native_quote);

        let top_by_tvl: Vec<SubgraphPool> = pools
            .iter()
            .filter(|pool| !chosen.contains(&pool.id))
            .take(cfg.top_n)
            .cloned()
            .collect();
        mark(&mut chosen, &top_by_tvl);

        let top_by_tvl_token_in: Vec<SubgraphPool> = pools
            .iter()
            .filter(|pool| !chosen.contains(&pool.id) && touches(pool, &in_key))
            .take(cfg.top_n_token_in_out)
            .cloned()
            .collect();
        mark(&mut chosen, &top_by_tvl_token_in);

        let top_by_tvl_token_out: Vec<SubgraphPool> = pools
            .iter()
            .filter(|pool| !chosen.contains(&pool.id) && touches(pool, &out_key))
            .take(cfg.top_n_token_in_out)
            .cloned()
            .collect();
        mark(&mut chosen, &top_by_tvl_token_out);

        // Second-hop seeds come from the tokenIn slice for BOTH directions.
        // The tokenOut variant reading its endpoints relative to tokenOut
        // (and so usually landing on token0) reproduces the deployed
        // router's selection; changing the seed set changes routing output.
        let token_in_second_hops = self.second_hop_slice(
            &pools,
            &mut chosen,
            &top_by_tvl_token_in,
            &in_key,
            cfg.top_n_second_hop,
        );
        let token_out_second_hops = self.second_hop_slice(
            &pools,
            &mut chosen,
            &top_by_tvl_token_in,
            &out_key,
            cfg.top_n_second_hop,
        );

        let selection = PoolsBySelection {
            top_direct,
            top_native_quote,
            top_by_tvl,
            top_by_tvl_token_in,
            top_by_tvl_token_out,
            token_in_second_hops,
            token_out_second_hops,
        };
        info!(
            candidates = selection.total(),
            direct = selection.top_direct.len(),
            bridge = selection.top_native_quote.len(),
            "Selected candidate pools"
        );

        let requests = self.to_state_requests(&selection);
        let accessor = self.pool_provider.get_pools(&requests, block).await?;
        Ok((accessor, selection))
    }

    fn known_token(&self, id: &str) -> bool {
        Address::from_str(id)
            .ok()
            .map(|address| self.registry.by_address(&address).is_some())
            .unwrap_or(false)
    }

    /// Pools pairing the wrapped native token with the quote token; these
    /// anchor gas costing. The EXACT_IN arm matches by address while the
    /// EXACT_OUT arm matches by symbol — deployed behavior, kept as is
    /// even though symbols are not unique.
    fn native_quote_slice(
        &self,
        pools: &[SubgraphPool],
        chosen: &HashSet<String>,
        token_in: &Token,
        token_out: &Token,
        trade_type: TradeType,
    ) -> Vec<SubgraphPool> {
        let Some(native) = wrapped_native(self.registry.chain_id()) else {
            return Vec::new();
        };
        match trade_type {
            TradeType::ExactIn => {
                let native_key = address_key(&native);
                let quote_key = address_key(token_out);
                pools
                    .iter()
                    .filter(|pool| !chosen.contains(&pool.id))
                    .filter(|pool| touches(pool, &native_key) && touches(pool, &quote_key))
                    .take(2)
                    .cloned()
                    .collect()
            }
            TradeType::ExactOut => pools
                .iter()
                .filter(|pool| !chosen.contains(&pool.id))
                .filter(|pool| {
                    (pool.token0.symbol == native.symbol && pool.token1.symbol == token_in.symbol)
                        || (pool.token0.symbol == token_in.symbol
                            && pool.token1.symbol == native.symbol)
                })
                .take(2)
                .cloned()
                .collect(),
        }
    }

    /// For each seed pool, read its endpoint relative to `endpoint_key`
    /// (token1 when token0 is the endpoint, token0 otherwise), then pull
    /// the top pools touching those second-hop tokens.
    fn second_hop_slice(
        &self,
        pools: &[SubgraphPool],
        chosen: &mut HashSet<String>,
        seeds: &[SubgraphPool],
        endpoint_key: &str,
        top_n_second_hop: usize,
    ) -> Vec<SubgraphPool> {
        let second_hop_ids: HashSet<String> = seeds
            .iter()
            .map(|pool| {
                if pool.token0.id == endpoint_key {
                    pool.token1.id.clone()
                } else {
                    pool.token0.id.clone()
                }
            })
            .collect();

        let mut slice: Vec<SubgraphPool> = Vec::new();
        for second_hop in &second_hop_ids {
            let per_seed: Vec<SubgraphPool> = pools
                .iter()
                .filter(|pool| !chosen.contains(&pool.id) && touches(pool, second_hop))
                .filter(|pool| !slice.iter().any(|picked| picked.id == pool.id))
                .take(top_n_second_hop)
                .cloned()
                .collect();
            slice.extend(per_seed);
        }
        slice.sort_by(|a, b| {
            b.tvl_usd()
                .partial_cmp(&a.tvl_usd())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        slice.truncate(top_n_second_hop);
        mark(chosen, &slice);
        slice
    }

    fn to_state_requests(&self, selection: &PoolsBySelection) -> Vec<(Token, Token, FeeTier)> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut requests = Vec::new();
        let slices = [
            &selection.top_direct,
            &selection.top_native_quote,
            &selection.top_by_tvl,
            &selection.top_by_tvl_token_in,
            &selection.top_by_tvl_token_out,
            &selection.token_in_second_hops,
            &selection.token_out_second_hops,
        ];
        for slice in slices {
            for pool in &*slice {
                if !seen.insert(pool.id.clone()) {
                    continue;
                }
                let Some(request) = self.resolve_request(pool) else {
                    debug!(pool = pool.id.as_str(), "Dropping unresolvable candidate");
                    continue;
                };
                requests.push(request);
            }
        }
        requests
    }

    fn resolve_request(&self, pool: &SubgraphPool) -> Option<(Token, Token, FeeTier)> {
        let token0 = self
            .registry
            .by_address(&Address::from_str(&pool.token0.id).ok()?)?
            .clone();
        let token1 = self
            .registry
            .by_address(&Address::from_str(&pool.token1.id).ok()?)?
            .clone();
        Some((token0, token1, pool.fee()?))
    }
}

fn mark(chosen: &mut HashSet<String>, slice: &[SubgraphPool]) {
    for pool in slice {
        chosen.insert(pool.id.clone());
    }
}
