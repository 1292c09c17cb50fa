use std::collections::{HashMap, HashSet};

use alloy_primitives::Address;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use tracing::{debug, info};

use crate::config::RoutingConfig;
use crate::errors::RouterError;
use crate::models::route::{
    AmountQuote, Route, RouteAmount, RouteWithValidQuote, SwapPlan, TradeType,
};
use crate::models::tokens::{Currency, Token};
use crate::services::gas::GasModel;

/// Plan metadata threaded through from the orchestrator.
pub struct PlanContext {
    pub token_in: Currency,
    pub token_out: Currency,
    pub block_number: u64,
}

/// Compose the best gas-adjusted swap from per-(route, percent) quotes:
/// the single best 100% route, or a 2- or 3-way split of pool-disjoint
/// routes whose percentages sum to 100.
///
/// Returns `Ok(None)` when no unsplit route survived quoting; splits are
/// never considered without a 100% baseline.
pub fn find_best_swap_plan(
    percents: &[u32],
    routes_with_quotes: Vec<(Route, Vec<AmountQuote>)>,
    quote_token: &Token,
    trade_type: TradeType,
    gas_model: &GasModel,
    cfg: &RoutingConfig,
    context: PlanContext,
) -> Result<Option<SwapPlan>, RouterError> {
    if cfg.max_splits > 3 {
        return Err(RouterError::config(format!(
            "maxSplits {} is unsupported; the split search is capped at 3",
            cfg.max_splits
        )));
    }

    let by_percent = bucket_valid_quotes(
        percents,
        routes_with_quotes,
        quote_token,
        trade_type,
        gas_model,
    );

    let Some(baseline_bucket) = by_percent.get(&100).filter(|bucket| !bucket.is_empty()) else {
        info!("No valid 100% route; returning empty plan");
        return Ok(None);
    };
    let mut best: Vec<&RouteWithValidQuote> = vec![&baseline_bucket[0]];
    let mut best_quote = baseline_bucket[0].quote_adjusted_for_gas.clone();
    debug!(
        baseline = %best_quote,
        buckets = by_percent.len(),
        "Starting split search from unsplit baseline"
    );

    if cfg.max_splits >= 2 {
        let half = percents.len().div_ceil(2);
        for &percent_a in percents.iter().take(half) {
            let Some(bucket_a) = by_percent.get(&percent_a) else {
                continue;
            };
            let a = &bucket_a[0];
            let percent_b = 100 - percent_a;
            let Some(bucket_b) = by_percent.get(&percent_b) else {
                continue;
            };
            let used = a.route.pool_addresses();
            let Some(b) = first_disjoint(bucket_b, &used) else {
                continue;
            };
            let combined = &a.quote_adjusted_for_gas + &b.quote_adjusted_for_gas;
            if trade_type.improves(&combined, &best_quote) {
                best = vec![a, b];
                best_quote = combined;
            }
        }
    }

    // The deployed search only explores 3-way splits once a 2-way split
    // has already beaten the unsplit baseline; a pair that only pays off
    // three ways is left on the table.
    if cfg.max_splits >= 3 && best.len() == 2 {
        for (i, &percent_a) in percents.iter().enumerate() {
            let Some(bucket_a) = by_percent.get(&percent_a) else {
                continue;
            };
            let a = &bucket_a[0];
            for &percent_b in percents.iter().skip(i + 1) {
                if percent_a + percent_b >= 100 {
                    continue;
                }
                let Some(bucket_b) = by_percent.get(&percent_b) else {
                    continue;
                };
                let mut used = a.route.pool_addresses();
                let Some(b) = first_disjoint(bucket_b, &used) else {
                    continue;
                };
                let percent_c = 100 - percent_a - percent_b;
                let Some(bucket_c) = by_percent.get(&percent_c) else {
                    continue;
                };
                used.extend(b.route.pool_addresses());
                let Some(c) = first_disjoint(bucket_c, &used) else {
                    continue;
                };
                let combined = &a.quote_adjusted_for_gas
                    + &b.quote_adjusted_for_gas
                    + &c.quote_adjusted_for_gas;
                if trade_type.improves(&combined, &best_quote) {
                    best = vec![a, b, c];
                    best_quote = combined;
                }
            }
        }
    }

    info!(
        components = best.len(),
        quote_gas_adjusted = %best_quote,
        "Split search complete"
    );
    Ok(Some(assemble_plan(best, trade_type, gas_model, context)))
}

/// Validate raw quotes and group them by percent, each bucket sorted
/// best-first on the gas-adjusted quote. Slots missing any quoter output
/// field are dropped here.
fn bucket_valid_quotes(
    percents: &[u32],
    routes_with_quotes: Vec<(Route, Vec<AmountQuote>)>,
    quote_token: &Token,
    trade_type: TradeType,
    gas_model: &GasModel,
) -> HashMap<u32, Vec<RouteWithValidQuote>> {
    let mut by_percent: HashMap<u32, Vec<RouteWithValidQuote>> = HashMap::new();
    let mut dropped = 0usize;
    for (route, quotes) in routes_with_quotes {
        for (index, quote) in quotes.into_iter().enumerate() {
            if !quote.is_valid() {
                dropped += 1;
                continue;
            }
            let Some(&percent) = percents.get(index) else {
                continue;
            };
            let raw_quote = quote.quote.expect("validated above");
            let estimate =
                gas_model.estimate_gas_cost(&route, quote.gas_estimate.expect("validated above"));
            let raw_signed = BigInt::from(raw_quote.clone());
            let cost_signed = BigInt::from(estimate.cost_in_quote_token.clone());
            let quote_adjusted_for_gas = match trade_type {
                TradeType::ExactIn => raw_signed - cost_signed,
                TradeType::ExactOut => raw_signed + cost_signed,
            };
            by_percent
                .entry(percent)
                .or_default()
                .push(RouteWithValidQuote {
                    route: route.clone(),
                    amount: quote.amount,
                    percent,
                    raw_quote,
                    quote_adjusted_for_gas,
                    gas_estimate: estimate.gas_used,
                    gas_cost_in_token: estimate.cost_in_native,
                    gas_cost_in_quote_token: estimate.cost_in_quote_token,
                    quote_token: quote_token.clone(),
                    trade_type,
                });
        }
    }
    if dropped > 0 {
        debug!(dropped, "Dropped invalid quote slots");
    }
    // Stable sort keeps insertion order among equal quotes.
    for bucket in by_percent.values_mut() {
        match trade_type {
            TradeType::ExactIn => {
                bucket.sort_by(|a, b| b.quote_adjusted_for_gas.cmp(&a.quote_adjusted_for_gas))
            }
            TradeType::ExactOut => {
                bucket.sort_by(|a, b| a.quote_adjusted_for_gas.cmp(&b.quote_adjusted_for_gas))
            }
        }
    }
    by_percent
}

/// First entry of a best-first bucket that shares no pool with the routes
/// already picked. The buckets are sorted, so the first disjoint candidate
/// is the best feasible one.
fn first_disjoint<'a>(
    bucket: &'a [RouteWithValidQuote],
    used: &HashSet<Address>,
) -> Option<&'a RouteWithValidQuote> {
    bucket
        .iter()
        .find(|candidate| candidate.route.disjoint_from(used))
}

fn assemble_plan(
    components: Vec<&RouteWithValidQuote>,
    trade_type: TradeType,
    gas_model: &GasModel,
    context: PlanContext,
) -> SwapPlan {
    let mut quote = BigUint::zero();
    let mut quote_gas_adjusted = BigInt::zero();
    let mut estimated_gas_used = 0u64;
    let mut route_amounts: Vec<RouteAmount> = Vec::with_capacity(components.len());
    for component in components {
        quote += &component.raw_quote;
        quote_gas_adjusted += &component.quote_adjusted_for_gas;
        estimated_gas_used += component.gas_estimate;
        route_amounts.push(RouteAmount {
            route: component.route.clone(),
            percent: component.percent,
            amount: component.amount.clone(),
            quote: component.raw_quote.clone(),
            quote_gas_adjusted: component.quote_adjusted_for_gas.clone(),
            gas_estimate: component.gas_estimate,
        });
    }
    route_amounts.sort_by(|a, b| b.percent.cmp(&a.percent));

    SwapPlan {
        token_in: context.token_in,
        token_out: context.token_out,
        trade_type,
        quote,
        quote_gas_adjusted,
        estimated_gas_used,
        gas_price_wei: gas_model.gas_price_wei().clone(),
        block_number: context.block_number,
        route_amounts,
    }
}
