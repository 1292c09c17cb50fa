use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use num_bigint::BigUint;
use tracing::{debug, info};

use crate::errors::RouterError;
use crate::models::pool::{compute_pool_address, FeeTier, Pool};
use crate::models::tokens::Token;
use crate::services::chain::ChainClient;
use crate::services::multicall::{encode_function_call, submit_multicall, MulticallCall};

const LIQUIDITY_SIGNATURE: &str = "liquidity()";
const SLOT0_SIGNATURE: &str = "slot0()";

/// Hydrated pool states for one request, keyed by deterministic address.
/// Pools that failed to hydrate are simply absent.
pub struct PoolAccessor {
    pools_by_address: HashMap<Address, Pool>,
}

impl PoolAccessor {
    pub fn new(pools: Vec<Pool>) -> Self {
        PoolAccessor {
            pools_by_address: pools.into_iter().map(|pool| (pool.address, pool)).collect(),
        }
    }

    /// Token order does not matter; the lookup key is the canonical pair.
    pub fn get_pool(&self, token_a: &Token, token_b: &Token, fee: FeeTier) -> Option<&Pool> {
        let (token0, token1) = if token_a.address < token_b.address {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        let address = compute_pool_address(&token0.address, &token1.address, fee);
        self.pools_by_address.get(&address)
    }

    pub fn get_pool_by_address(&self, address: &Address) -> Option<&Pool> {
        self.pools_by_address.get(address)
    }

    pub fn all_pools(&self) -> Vec<Pool> {
        self.pools_by_address.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pools_by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools_by_address.is_empty()
    }
}

/// Resolves `(tokenA, tokenB, fee)` tuples into live pool state in one
/// aggregator batch.
#[async_trait]
pub trait PoolStateProvider: Send + Sync {
    async fn get_pools(
        &self,
        requests: &[(Token, Token, FeeTier)],
        block: Option<u64>,
    ) -> Result<PoolAccessor, RouterError>;
}

pub struct MulticallPoolProvider {
    chain: Arc<dyn ChainClient>,
    gas_limit_per_call: u64,
}

impl MulticallPoolProvider {
    pub fn new(chain: Arc<dyn ChainClient>, gas_limit_per_call: u64) -> Self {
        MulticallPoolProvider {
            chain,
            gas_limit_per_call,
        }
    }
}

#[async_trait]
impl PoolStateProvider for MulticallPoolProvider {
    async fn get_pools(
        &self,
        requests: &[(Token, Token, FeeTier)],
        block: Option<u64>,
    ) -> Result<PoolAccessor, RouterError> {
        // Canonicalise and deduplicate before building calldata; the same
        // pool is often requested from both trade directions.
        let mut unique: HashMap<Address, (Token, Token, FeeTier)> = HashMap::new();
        for (token_a, token_b, fee) in requests {
            let (token0, token1) = if token_a.address < token_b.address {
                (token_a.clone(), token_b.clone())
            } else {
                (token_b.clone(), token_a.clone())
            };
            let address = compute_pool_address(&token0.address, &token1.address, *fee);
            unique.entry(address).or_insert((token0, token1, *fee));
        }

        let mut entries: Vec<(Address, (Token, Token, FeeTier))> = unique.into_iter().collect();
        entries.sort_by_key(|(address, _)| *address);

        let mut calls = Vec::with_capacity(entries.len() * 2);
        for (address, _) in &entries {
            calls.push(MulticallCall {
                target: *address,
                gas_limit: self.gas_limit_per_call,
                calldata: encode_function_call(LIQUIDITY_SIGNATURE, Vec::new()),
            });
            calls.push(MulticallCall {
                target: *address,
                gas_limit: self.gas_limit_per_call,
                calldata: encode_function_call(SLOT0_SIGNATURE, Vec::new()),
            });
        }

        if calls.is_empty() {
            return Ok(PoolAccessor::new(Vec::new()));
        }

        let (_, results) = submit_multicall(self.chain.as_ref(), &calls, block).await?;

        let mut pools = Vec::with_capacity(entries.len());
        for (index, (address, (token0, token1, fee))) in entries.into_iter().enumerate() {
            let liquidity_result = &results[index * 2];
            let slot0_result = &results[index * 2 + 1];
            if liquidity_result.reverted() || slot0_result.reverted() {
                debug!(pool = %address, "Pool state call reverted; omitting pool");
                continue;
            }
            let Some(liquidity) = decode_word(&liquidity_result.return_data, 0) else {
                debug!(pool = %address, "Short liquidity response; omitting pool");
                continue;
            };
            let Some(sqrt_price_x96) = decode_word(&slot0_result.return_data, 0) else {
                debug!(pool = %address, "Short slot0 response; omitting pool");
                continue;
            };
            let Some(tick) = decode_tick(&slot0_result.return_data) else {
                debug!(pool = %address, "Slot0 missing tick word; omitting pool");
                continue;
            };
            pools.push(Pool::new(
                token0,
                token1,
                fee,
                liquidity,
                sqrt_price_x96,
                tick,
            ));
        }

        info!(
            hydrated = pools.len(),
            requested = requests.len(),
            "Hydrated pool states"
        );
        Ok(PoolAccessor::new(pools))
    }
}

fn decode_word(data: &[u8], index: usize) -> Option<BigUint> {
    let start = index * 32;
    data.get(start..start + 32).map(BigUint::from_bytes_be)
}

/// The tick is an int24 sign-extended to a full word; the low eight bytes
/// carry the two's-complement value.
fn decode_tick(data: &[u8]) -> Option<i32> {
    let word = data.get(32..64)?;
    let low: [u8; 8] = word[24..32].try_into().ok()?;
    Some(u64::from_be_bytes(low) as i64 as i32)
}
