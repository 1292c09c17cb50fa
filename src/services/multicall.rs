use std::str::FromStr;

use alloy_primitives::{Address, Keccak256, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use futures::future::try_join_all;
use num_bigint::BigUint;
use tracing::{debug, warn};

use crate::errors::RouterError;
use crate::models::route::{AmountQuote, Route, RoutesWithQuotes, TradeType};
use crate::services::chain::ChainClient;

/// Well-known aggregator contract executing batched read calls with
/// per-call gas metering.
pub const MULTICALL_ADDRESS: &str = "0x1F98415757620B543A52E61c46B32eB19261F984";
/// Well-known quoter contract simulating swaps along a packed path.
pub const QUOTER_ADDRESS: &str = "0x61fFE014bA17989E743c5F6cB21bF9697530B21e";

const MULTICALL_SIGNATURE: &str = "multicall((address,uint256,bytes)[])";
const QUOTE_EXACT_INPUT_SIGNATURE: &str = "quoteExactInput(bytes,uint256)";
const QUOTE_EXACT_OUTPUT_SIGNATURE: &str = "quoteExactOutput(bytes,uint256)";

pub(crate) fn function_selector(signature: &str) -> [u8; 4] {
    let mut hasher = Keccak256::new();
    hasher.update(signature.as_bytes());
    let hash = hasher.finalize();
    [hash[0], hash[1], hash[2], hash[3]]
}

pub(crate) fn encode_function_call(signature: &str, encoded_args: Vec<u8>) -> Vec<u8> {
    let selector = function_selector(signature);
    let mut calldata = Vec::with_capacity(4 + encoded_args.len());
    calldata.extend_from_slice(&selector);
    calldata.extend(encoded_args);
    calldata
}

pub(crate) fn biguint_to_u256(value: &BigUint, field: &str) -> Result<U256, RouterError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(RouterError::internal(format!(
            "{} does not fit in uint256",
            field
        )));
    }
    Ok(U256::from_be_slice(&bytes))
}

pub(crate) fn u256_to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

/// One sub-call of an aggregator batch.
pub struct MulticallCall {
    pub target: Address,
    pub gas_limit: u64,
    pub calldata: Vec<u8>,
}

/// Per-call outcome as the aggregator reports it. `success == false` and
/// empty return data both mean the simulated call reverted.
pub struct MulticallResult {
    pub success: bool,
    pub gas_used: u64,
    pub return_data: Vec<u8>,
}

impl MulticallResult {
    pub fn reverted(&self) -> bool {
        !self.success || self.return_data.is_empty()
    }
}

/// Submit one aggregator batch. Returns the aggregator-reported block
/// number and the per-call results in call order.
pub async fn submit_multicall(
    chain: &dyn ChainClient,
    calls: &[MulticallCall],
    block: Option<u64>,
) -> Result<(u64, Vec<MulticallResult>), RouterError> {
    let encoded_calls: Vec<(Address, U256, alloy_primitives::Bytes)> = calls
        .iter()
        .map(|call| {
            (
                call.target,
                U256::from(call.gas_limit),
                alloy_primitives::Bytes::from(call.calldata.clone()),
            )
        })
        .collect();
    let calldata = encode_function_call(MULTICALL_SIGNATURE, (encoded_calls,).abi_encode_params());

    let target = Address::from_str(MULTICALL_ADDRESS).expect("well-known aggregator address");
    let raw = chain.eth_call(target, calldata, block).await?;

    let (block_number, results) =
        <(U256, Vec<(bool, U256, alloy_primitives::Bytes)>)>::abi_decode_params(&raw).map_err(
            |e| RouterError::internal(format!("Failed to decode aggregator response: {}", e)),
        )?;
    if results.len() != calls.len() {
        return Err(RouterError::internal(format!(
            "Aggregator returned {} results for {} calls",
            results.len(),
            calls.len()
        )));
    }

    let results = results
        .into_iter()
        .map(|(success, gas_used, return_data)| MulticallResult {
            success,
            gas_used: gas_used.try_into().unwrap_or(u64::MAX),
            return_data: return_data.to_vec(),
        })
        .collect();
    Ok((block_number.try_into().unwrap_or(u64::MAX), results))
}

/// Packed quoter path for a route: `token ‖ fee ‖ token ‖ … ‖ token`.
/// Exact-output quoting walks the path from the output side, so the
/// encoding is reversed for that direction.
pub(crate) fn encode_swap_path(route: &Route, trade_type: TradeType) -> Vec<u8> {
    let mut path = Vec::with_capacity(route.token_path.len() * 23);
    match trade_type {
        TradeType::ExactIn => {
            for (index, token) in route.token_path.iter().enumerate() {
                path.extend_from_slice(token.address.as_slice());
                if let Some(pool) = route.pools.get(index) {
                    path.extend_from_slice(&pool.fee.as_u32().to_be_bytes()[1..4]);
                }
            }
        }
        TradeType::ExactOut => {
            for (index, token) in route.token_path.iter().rev().enumerate() {
                path.extend_from_slice(token.address.as_slice());
                if index < route.pools.len() {
                    let pool = &route.pools[route.pools.len() - 1 - index];
                    path.extend_from_slice(&pool.fee.as_u32().to_be_bytes()[1..4]);
                }
            }
        }
    }
    path
}

/// Batched swap quoting: one simulated quoter call per (route, amount)
/// pair, aggregated into chunked multicalls.
#[async_trait]
pub trait SwapQuoter: Send + Sync {
    async fn quote_many_exact_in(
        &self,
        amounts: &[BigUint],
        routes: Vec<Route>,
        block: Option<u64>,
    ) -> Result<RoutesWithQuotes, RouterError>;

    async fn quote_many_exact_out(
        &self,
        amounts: &[BigUint],
        routes: Vec<Route>,
        block: Option<u64>,
    ) -> Result<RoutesWithQuotes, RouterError>;
}

pub struct MulticallQuoter {
    chain: std::sync::Arc<dyn ChainClient>,
    chunk_size: usize,
    gas_limit_per_call: u64,
}

impl MulticallQuoter {
    pub fn new(
        chain: std::sync::Arc<dyn ChainClient>,
        chunk_size: usize,
        gas_limit_per_call: u64,
    ) -> Self {
        MulticallQuoter {
            chain,
            chunk_size,
            gas_limit_per_call,
        }
    }

    async fn quote_many(
        &self,
        trade_type: TradeType,
        amounts: &[BigUint],
        routes: Vec<Route>,
        block: Option<u64>,
    ) -> Result<RoutesWithQuotes, RouterError> {
        if routes.is_empty() || amounts.is_empty() {
            return Ok(RoutesWithQuotes {
                block_number: 0,
                routes_with_quotes: Vec::new(),
                approx_gas_used_per_success_call: 0,
            });
        }

        let signature = match trade_type {
            TradeType::ExactIn => QUOTE_EXACT_INPUT_SIGNATURE,
            TradeType::ExactOut => QUOTE_EXACT_OUTPUT_SIGNATURE,
        };
        let quoter = Address::from_str(QUOTER_ADDRESS).expect("well-known quoter address");

        // Row-major: all amounts of route 0, then route 1, and so on. The
        // response is reassembled in this same order regardless of batch
        // completion order.
        let mut calls = Vec::with_capacity(routes.len() * amounts.len());
        for route in &routes {
            let path = encode_swap_path(route, trade_type);
            for amount in amounts {
                let amount_word = biguint_to_u256(amount, "quote amount")?;
                let args = (alloy_primitives::Bytes::from(path.clone()), amount_word)
                    .abi_encode_params();
                calls.push(MulticallCall {
                    target: quoter,
                    gas_limit: self.gas_limit_per_call,
                    calldata: encode_function_call(signature, args),
                });
            }
        }

        let batches: Vec<&[MulticallCall]> = calls.chunks(self.chunk_size).collect();
        debug!(
            calls = calls.len(),
            batches = batches.len(),
            chunk = self.chunk_size,
            "Submitting quote batches"
        );
        let submissions = batches
            .iter()
            .map(|batch| submit_multicall(self.chain.as_ref(), batch, block));
        let completed = try_join_all(submissions).await?;

        let block_number = completed
            .first()
            .map(|(block, _)| *block)
            .unwrap_or_default();
        let mut flat: Vec<MulticallResult> = Vec::with_capacity(calls.len());
        for (_, results) in completed {
            flat.extend(results);
        }

        let mut success_gas: Vec<u64> = Vec::new();
        let mut failed_calls = 0usize;
        let amounts_per_route = amounts.len();
        let mut routes_with_quotes = Vec::with_capacity(routes.len());
        for (route_index, route) in routes.into_iter().enumerate() {
            let mut quotes = Vec::with_capacity(amounts_per_route);
            for (amount_index, amount) in amounts.iter().enumerate() {
                let result = &flat[route_index * amounts_per_route + amount_index];
                if result.reverted() {
                    failed_calls += 1;
                    quotes.push(AmountQuote::failed(amount.clone()));
                    continue;
                }
                success_gas.push(result.gas_used);
                quotes.push(decode_quote(amount.clone(), &result.return_data)?);
            }
            routes_with_quotes.push((route, quotes));
        }

        if failed_calls > 0 {
            warn!(
                failed = failed_calls,
                total = flat.len(),
                "Some quote calls reverted; dropping those slots"
            );
        }

        Ok(RoutesWithQuotes {
            block_number,
            routes_with_quotes,
            approx_gas_used_per_success_call: percentile_99(&mut success_gas),
        })
    }
}

fn decode_quote(amount: BigUint, return_data: &[u8]) -> Result<AmountQuote, RouterError> {
    let (quote, sqrt_price_after, ticks_crossed, gas_estimate) =
        <(U256, Vec<U256>, Vec<u32>, U256)>::abi_decode_params(return_data)
            .map_err(|e| RouterError::internal(format!("Failed to decode quote: {}", e)))?;
    Ok(AmountQuote {
        amount,
        quote: Some(u256_to_biguint(quote)),
        sqrt_price_x96_after_list: Some(sqrt_price_after.into_iter().map(u256_to_biguint).collect()),
        initialized_ticks_crossed_list: Some(ticks_crossed),
        gas_estimate: Some(gas_estimate.try_into().unwrap_or(u64::MAX)),
    })
}

/// 99th-percentile of the successful-call gas samples; 0 when empty.
fn percentile_99(samples: &mut [u64]) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    samples.sort_unstable();
    let rank = (samples.len() * 99).div_ceil(100);
    samples[rank.saturating_sub(1)]
}

#[async_trait]
impl SwapQuoter for MulticallQuoter {
    async fn quote_many_exact_in(
        &self,
        amounts: &[BigUint],
        routes: Vec<Route>,
        block: Option<u64>,
    ) -> Result<RoutesWithQuotes, RouterError> {
        self.quote_many(TradeType::ExactIn, amounts, routes, block)
            .await
    }

    async fn quote_many_exact_out(
        &self,
        amounts: &[BigUint],
        routes: Vec<Route>,
        block: Option<u64>,
    ) -> Result<RoutesWithQuotes, RouterError> {
        self.quote_many(TradeType::ExactOut, amounts, routes, block)
            .await
    }
}
