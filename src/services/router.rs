use std::sync::Arc;
use std::time::Instant;

use num_bigint::BigUint;
use tracing::{debug, info};

use crate::config::RoutingConfig;
use crate::errors::RouterError;
use crate::metrics::{
    emit_quoter_gas_p99, emit_route_completion, emit_stage_latency, RouteOutcome,
};
use crate::models::route::{SwapPlan, TradeType};
use crate::models::tokens::Currency;
use crate::services::amounts::distribute_amount;
use crate::services::chain::GasPriceOracle;
use crate::services::gas::GasModel;
use crate::services::multicall::SwapQuoter;
use crate::services::paths::compute_all_routes;
use crate::services::selection::CandidatePoolSelector;
use crate::services::split::{find_best_swap_plan, PlanContext};

/// End-to-end pipeline for one routing request: candidate selection, route
/// enumeration, amount distribution, batched quoting and split search.
/// Native endpoints are wrapped on entry and reported back unchanged on
/// the emitted plan.
pub struct SwapRouter {
    chain_id: u64,
    selector: CandidatePoolSelector,
    quoter: Arc<dyn SwapQuoter>,
    gas_oracle: Arc<dyn GasPriceOracle>,
    config: RoutingConfig,
}

impl SwapRouter {
    pub fn new(
        chain_id: u64,
        selector: CandidatePoolSelector,
        quoter: Arc<dyn SwapQuoter>,
        gas_oracle: Arc<dyn GasPriceOracle>,
        config: RoutingConfig,
    ) -> Self {
        SwapRouter {
            chain_id,
            selector,
            quoter,
            gas_oracle,
            config,
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub async fn route(
        &self,
        token_in: Currency,
        token_out: Currency,
        amount: BigUint,
        trade_type: TradeType,
    ) -> Result<Option<SwapPlan>, RouterError> {
        let outcome = self
            .route_inner(token_in, token_out, amount, trade_type)
            .await;
        emit_route_completion(match &outcome {
            Ok(Some(_)) => RouteOutcome::Planned,
            Ok(None) => RouteOutcome::NoRoute,
            Err(_) => RouteOutcome::Failed,
        });
        outcome
    }

    async fn route_inner(
        &self,
        token_in: Currency,
        token_out: Currency,
        amount: BigUint,
        trade_type: TradeType,
    ) -> Result<Option<SwapPlan>, RouterError> {
        self.config.validate()?;

        let wrapped_in = token_in.wrapped()?;
        let wrapped_out = token_out.wrapped()?;
        if wrapped_in == wrapped_out {
            return Err(RouterError::config(
                "tokenIn and tokenOut resolve to the same token",
            ));
        }
        info!(
            token_in = wrapped_in.symbol.as_str(),
            token_out = wrapped_out.symbol.as_str(),
            amount = %amount,
            trade_type = ?trade_type,
            "Routing request"
        );

        let stage = Instant::now();
        let (accessor, selection) = self
            .selector
            .select(&wrapped_in, &wrapped_out, trade_type, &self.config, None)
            .await?;
        emit_stage_latency("pool_selection", stage.elapsed().as_millis() as u64);

        let stage = Instant::now();
        let pools = accessor.all_pools();
        let routes = compute_all_routes(
            &wrapped_in,
            &wrapped_out,
            &pools,
            self.config.max_swaps_per_path,
        );
        emit_stage_latency("route_enumeration", stage.elapsed().as_millis() as u64);
        if routes.is_empty() {
            info!(
                token_in = wrapped_in.symbol.as_str(),
                token_out = wrapped_out.symbol.as_str(),
                "No candidate route connects the pair"
            );
            return Ok(None);
        }
        debug!(routes = routes.len(), pools = pools.len(), "Routes ready");

        let (percents, amounts) = distribute_amount(&amount, self.config.distribution_percent)?;

        let stage = Instant::now();
        let gas_price_wei = self.gas_oracle.gas_price_wei().await?;
        emit_stage_latency("gas_price", stage.elapsed().as_millis() as u64);

        let quote_token = match trade_type {
            TradeType::ExactIn => wrapped_out.clone(),
            TradeType::ExactOut => wrapped_in.clone(),
        };

        let stage = Instant::now();
        let quoted = match trade_type {
            TradeType::ExactIn => {
                self.quoter
                    .quote_many_exact_in(&amounts, routes, None)
                    .await?
            }
            TradeType::ExactOut => {
                self.quoter
                    .quote_many_exact_out(&amounts, routes, None)
                    .await?
            }
        };
        emit_stage_latency("quoting", stage.elapsed().as_millis() as u64);
        emit_quoter_gas_p99(quoted.approx_gas_used_per_success_call);

        let stage = Instant::now();
        let gas_model = GasModel::build(
            self.chain_id,
            gas_price_wei,
            &accessor,
            &selection,
            quote_token.clone(),
        );
        let plan = find_best_swap_plan(
            &percents,
            quoted.routes_with_quotes,
            &quote_token,
            trade_type,
            &gas_model,
            &self.config,
            PlanContext {
                token_in,
                token_out,
                block_number: quoted.block_number,
            },
        )?;
        emit_stage_latency("split_search", stage.elapsed().as_millis() as u64);

        match &plan {
            Some(plan) => info!(
                components = plan.route_amounts.len(),
                quote = %plan.quote,
                quote_gas_adjusted = %plan.quote_gas_adjusted,
                gas = plan.estimated_gas_used,
                block = plan.block_number,
                "Swap plan assembled"
            ),
            None => info!("No valid full-size route after quoting"),
        }
        Ok(plan)
    }
}
