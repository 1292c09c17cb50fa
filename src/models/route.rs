use std::collections::HashSet;

use alloy_primitives::Address;
use num_bigint::{BigInt, BigUint};

use super::pool::Pool;
use super::tokens::{Currency, Token};

/// Which side of the trade the caller fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeType {
    ExactIn,
    ExactOut,
}

impl TradeType {
    /// Whether `candidate` beats `incumbent` for this direction: more output
    /// for EXACT_IN, less input for EXACT_OUT.
    pub fn improves(self, candidate: &BigInt, incumbent: &BigInt) -> bool {
        match self {
            TradeType::ExactIn => candidate > incumbent,
            TradeType::ExactOut => candidate < incumbent,
        }
    }
}

/// An ordered pool chain from `input` to `output`. Consecutive pools share
/// a token and no pool repeats.
#[derive(Debug, Clone)]
pub struct Route {
    pub pools: Vec<Pool>,
    /// Token endpoints along the chain; `token_path.len() == pools.len() + 1`.
    pub token_path: Vec<Token>,
    pub input: Token,
    pub output: Token,
}

impl Route {
    /// Build a route from an ordered pool list, deriving the token path by
    /// walking from `input`. Returns `None` if the chain does not connect
    /// `input` to `output` or a pool repeats.
    pub fn new(pools: Vec<Pool>, input: Token, output: Token) -> Option<Self> {
        if pools.is_empty() {
            return None;
        }
        let mut seen: HashSet<Address> = HashSet::with_capacity(pools.len());
        let mut token_path = Vec::with_capacity(pools.len() + 1);
        token_path.push(input.clone());
        let mut current = input.clone();
        for pool in &pools {
            if !seen.insert(pool.address) {
                return None;
            }
            let next = pool.counterparty(&current)?.clone();
            token_path.push(next.clone());
            current = next;
        }
        if current != output {
            return None;
        }
        Some(Route {
            pools,
            token_path,
            input,
            output,
        })
    }

    pub fn pool_addresses(&self) -> HashSet<Address> {
        self.pools.iter().map(|pool| pool.address).collect()
    }

    /// True if the two routes share no pool.
    pub fn disjoint_from(&self, used: &HashSet<Address>) -> bool {
        self.pools.iter().all(|pool| !used.contains(&pool.address))
    }
}

/// Result of quoting one amount along one route. All optional fields are
/// present on success and absent together when the simulated call failed.
#[derive(Debug, Clone)]
pub struct AmountQuote {
    pub amount: BigUint,
    pub quote: Option<BigUint>,
    pub sqrt_price_x96_after_list: Option<Vec<BigUint>>,
    pub initialized_ticks_crossed_list: Option<Vec<u32>>,
    pub gas_estimate: Option<u64>,
}

impl AmountQuote {
    pub fn failed(amount: BigUint) -> Self {
        AmountQuote {
            amount,
            quote: None,
            sqrt_price_x96_after_list: None,
            initialized_ticks_crossed_list: None,
            gas_estimate: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.quote.is_some()
            && self.sqrt_price_x96_after_list.is_some()
            && self.initialized_ticks_crossed_list.is_some()
            && self.gas_estimate.is_some()
    }
}

/// Batched quoter output: per route, one [`AmountQuote`] per requested
/// amount, in the caller's order.
#[derive(Debug)]
pub struct RoutesWithQuotes {
    pub block_number: u64,
    pub routes_with_quotes: Vec<(Route, Vec<AmountQuote>)>,
    /// 99th-percentile gas across successful calls, for observability.
    pub approx_gas_used_per_success_call: u64,
}

/// A quoted (route, percent) candidate that survived validation, priced
/// with its gas cost in the quote token.
#[derive(Debug, Clone)]
pub struct RouteWithValidQuote {
    pub route: Route,
    pub amount: BigUint,
    pub percent: u32,
    pub raw_quote: BigUint,
    /// `raw_quote - gas_cost` for EXACT_IN, `raw_quote + gas_cost` for
    /// EXACT_OUT. Signed: gas can exceed a small quote.
    pub quote_adjusted_for_gas: BigInt,
    pub gas_estimate: u64,
    pub gas_cost_in_token: BigUint,
    pub gas_cost_in_quote_token: BigUint,
    pub quote_token: Token,
    pub trade_type: TradeType,
}

/// One component of the final plan.
#[derive(Debug, Clone)]
pub struct RouteAmount {
    pub route: Route,
    pub percent: u32,
    pub amount: BigUint,
    pub quote: BigUint,
    pub quote_gas_adjusted: BigInt,
    pub gas_estimate: u64,
}

/// The routing result: one or more pool-disjoint routes whose percentages
/// sum to 100, with exact aggregate quotes.
#[derive(Debug, Clone)]
pub struct SwapPlan {
    pub token_in: Currency,
    pub token_out: Currency,
    pub trade_type: TradeType,
    pub quote: BigUint,
    pub quote_gas_adjusted: BigInt,
    pub estimated_gas_used: u64,
    pub gas_price_wei: BigUint,
    pub block_number: u64,
    pub route_amounts: Vec<RouteAmount>,
}
