use std::str::FromStr;

use alloy_primitives::Address;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

use crate::models::pool::Pool;
use crate::models::route::Route;
use crate::models::tokens::{wrapped_native, Token};
use crate::services::pool_provider::PoolAccessor;
use crate::services::selection::PoolsBySelection;

/// Router dispatch overhead added on top of the quoter's simulated gas for
/// every hop beyond the first.
const GAS_OVERHEAD_PER_EXTRA_HOP: u64 = 80_000;

#[derive(Debug, Clone)]
pub struct RouteGasEstimate {
    pub gas_used: u64,
    pub cost_in_native: BigUint,
    pub cost_in_quote_token: BigUint,
}

/// Prices route gas in the quote token. The conversion leans on the
/// highest-TVL pool pairing the wrapped native token with the quote token;
/// without one the cost degrades to zero while the gas figure itself is
/// still reported.
pub struct GasModel {
    gas_price_wei: BigUint,
    quote_token: Token,
    native_token: Option<Token>,
    bridge_pool: Option<Pool>,
}

impl GasModel {
    pub fn build(
        chain_id: u64,
        gas_price_wei: BigUint,
        accessor: &PoolAccessor,
        selection: &PoolsBySelection,
        quote_token: Token,
    ) -> Self {
        let native_token = wrapped_native(chain_id);
        let bridge_pool = match &native_token {
            Some(native) if *native != quote_token => selection
                .top_native_quote
                .iter()
                .filter_map(|pool| Address::from_str(&pool.id).ok())
                .filter_map(|address| accessor.get_pool_by_address(&address).cloned())
                .next(),
            _ => None,
        };
        if bridge_pool.is_none() {
            if let Some(native) = &native_token {
                if *native != quote_token {
                    debug!(
                        quote = quote_token.symbol.as_str(),
                        "No native bridge pool hydrated; gas costs degrade to zero"
                    );
                }
            }
        }
        GasModel {
            gas_price_wei,
            quote_token,
            native_token,
            bridge_pool,
        }
    }

    pub fn gas_price_wei(&self) -> &BigUint {
        &self.gas_price_wei
    }

    pub fn estimate_gas_cost(&self, route: &Route, quoter_gas_estimate: u64) -> RouteGasEstimate {
        let extra_hops = route.pools.len().saturating_sub(1) as u64;
        let gas_used = quoter_gas_estimate + GAS_OVERHEAD_PER_EXTRA_HOP * extra_hops;
        let cost_in_native = BigUint::from(gas_used) * &self.gas_price_wei;

        let cost_in_quote_token = match &self.native_token {
            Some(native) if *native == self.quote_token => cost_in_native.clone(),
            Some(native) => match &self.bridge_pool {
                Some(bridge) => convert_native_cost(bridge, native, &cost_in_native),
                None => BigUint::zero(),
            },
            None => BigUint::zero(),
        };

        RouteGasEstimate {
            gas_used,
            cost_in_native,
            cost_in_quote_token,
        }
    }
}

/// Convert a wei cost into the bridge pool's other token using the pool's
/// current sqrt price, in exact integer arithmetic: the raw token1/token0
/// price is `p² / 2¹⁹²` for `p = sqrt_price_x96`.
fn convert_native_cost(bridge: &Pool, native: &Token, cost_in_native: &BigUint) -> BigUint {
    let price_squared = &bridge.sqrt_price_x96 * &bridge.sqrt_price_x96;
    if price_squared.is_zero() {
        return BigUint::zero();
    }
    let shift = BigUint::from(1u8) << 192;
    if bridge.token0 == *native {
        cost_in_native * &price_squared / shift
    } else {
        cost_in_native * shift / price_squared
    }
}
