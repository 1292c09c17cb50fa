use serde::{Deserialize, Serialize};

use super::route::{RouteAmount, SwapPlan, TradeType};
use super::tokens::Currency;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Address (hex) or registry symbol; "ETH" selects the native coin.
    pub token_in: String,
    pub token_out: String,
    /// Base-10 amount in the fixed token's smallest unit.
    pub amount: String,
    pub trade_type: TradeTypeField,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub enum TradeTypeField {
    #[serde(rename = "exactIn")]
    ExactIn,
    #[serde(rename = "exactOut")]
    ExactOut,
}

impl From<TradeTypeField> for TradeType {
    fn from(value: TradeTypeField) -> Self {
        match value {
            TradeTypeField::ExactIn => TradeType::ExactIn,
            TradeTypeField::ExactOut => TradeType::ExactOut,
        }
    }
}

impl From<TradeType> for TradeTypeField {
    fn from(value: TradeType) -> Self {
        match value {
            TradeType::ExactIn => TradeTypeField::ExactIn,
            TradeType::ExactOut => TradeTypeField::ExactOut,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HopPayload {
    pub pool_address: String,
    pub token_in: String,
    pub token_out: String,
    pub fee: u32,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RouteAmountPayload {
    pub percent: u32,
    pub amount: String,
    pub quote: String,
    pub quote_gas_adjusted: String,
    pub gas_estimate: u64,
    pub hops: Vec<HopPayload>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlanPayload {
    pub token_in: String,
    pub token_out: String,
    pub trade_type: TradeTypeField,
    pub quote: String,
    pub quote_gas_adjusted: String,
    pub estimated_gas_used: u64,
    pub gas_price_wei: String,
    pub block_number: u64,
    pub routes: Vec<RouteAmountPayload>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// `null` when no route connects the pair at any split.
    pub plan: Option<PlanPayload>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RouteErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

fn currency_field(currency: &Currency) -> String {
    match currency {
        Currency::Native { .. } => "native".to_string(),
        Currency::Erc20(token) => format!("{:#x}", token.address),
    }
}

impl PlanPayload {
    pub fn from_plan(plan: &SwapPlan) -> Self {
        PlanPayload {
            token_in: currency_field(&plan.token_in),
            token_out: currency_field(&plan.token_out),
            trade_type: plan.trade_type.into(),
            quote: plan.quote.to_str_radix(10),
            quote_gas_adjusted: plan.quote_gas_adjusted.to_str_radix(10),
            estimated_gas_used: plan.estimated_gas_used,
            gas_price_wei: plan.gas_price_wei.to_str_radix(10),
            block_number: plan.block_number,
            routes: plan
                .route_amounts
                .iter()
                .map(RouteAmountPayload::from_route_amount)
                .collect(),
        }
    }
}

impl RouteAmountPayload {
    fn from_route_amount(component: &RouteAmount) -> Self {
        let hops = component
            .route
            .pools
            .iter()
            .zip(component.route.token_path.windows(2))
            .map(|(pool, pair)| HopPayload {
                pool_address: format!("{:#x}", pool.address),
                token_in: format!("{:#x}", pair[0].address),
                token_out: format!("{:#x}", pair[1].address),
                fee: pool.fee.as_u32(),
            })
            .collect();
        RouteAmountPayload {
            percent: component.percent,
            amount: component.amount.to_str_radix(10),
            quote: component.quote.to_str_radix(10),
            quote_gas_adjusted: component.quote_gas_adjusted.to_str_radix(10),
            gas_estimate: component.gas_estimate,
            hops,
        }
    }
}
