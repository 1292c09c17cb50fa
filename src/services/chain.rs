use alloy_primitives::Address;
use async_trait::async_trait;
use num_bigint::BigUint;
use num_traits::Num;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::RouterError;

/// Minimal JSON-RPC surface the router needs from a node: a single
/// read-only contract call, optionally pinned to a block.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn eth_call(
        &self,
        to: Address,
        data: Vec<u8>,
        block: Option<u64>,
    ) -> Result<Vec<u8>, RouterError>;
}

/// Current gas price in wei. Failure here is fatal to the request; there is
/// no meaningful gas-adjusted quote without a price.
#[async_trait]
pub trait GasPriceOracle: Send + Sync {
    async fn gas_price_wei(&self) -> Result<BigUint, RouterError>;
}

/// HTTP JSON-RPC client shared across requests. `reqwest::Client` is
/// internally pooled, so one instance serves concurrent callers.
pub struct HttpRpcClient {
    client: reqwest::Client,
    url: String,
}

impl HttpRpcClient {
    pub fn new(url: String) -> Self {
        HttpRpcClient {
            client: reqwest::Client::new(),
            url,
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RouterError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RouterError::transport(format!("{} request failed: {}", method, e)))?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| RouterError::transport(format!("{} bad response body: {}", method, e)))?;
        if let Some(error) = payload.get("error") {
            return Err(RouterError::transport(format!(
                "{} returned error: {}",
                method, error
            )));
        }
        payload
            .get("result")
            .cloned()
            .ok_or_else(|| RouterError::transport(format!("{} response missing result", method)))
    }
}

fn block_tag(block: Option<u64>) -> Value {
    match block {
        Some(number) => json!(format!("0x{:x}", number)),
        None => json!("latest"),
    }
}

fn decode_hex_result(method: &str, value: &Value) -> Result<Vec<u8>, RouterError> {
    let text = value
        .as_str()
        .ok_or_else(|| RouterError::transport(format!("{} result is not a string", method)))?;
    let stripped = text.trim_start_matches("0x");
    alloy_primitives::hex::decode(stripped)
        .map_err(|e| RouterError::transport(format!("{} result is not hex: {}", method, e)))
}

#[async_trait]
impl ChainClient for HttpRpcClient {
    async fn eth_call(
        &self,
        to: Address,
        data: Vec<u8>,
        block: Option<u64>,
    ) -> Result<Vec<u8>, RouterError> {
        let params = json!([
            {
                "to": format!("{:#x}", to),
                "data": format!("0x{}", alloy_primitives::hex::encode(&data)),
            },
            block_tag(block),
        ]);
        debug!(to = %to, bytes = data.len(), "Submitting eth_call");
        let result = self.request("eth_call", params).await?;
        decode_hex_result("eth_call", &result)
    }
}

#[async_trait]
impl GasPriceOracle for HttpRpcClient {
    async fn gas_price_wei(&self) -> Result<BigUint, RouterError> {
        let result = self
            .request("eth_gasPrice", json!([]))
            .await
            .map_err(|e| RouterError::gas_price(format!("Gas price fetch failed: {}", e)))?;
        let text = result
            .as_str()
            .ok_or_else(|| RouterError::gas_price("eth_gasPrice result is not a string"))?;
        let stripped = text.trim_start_matches("0x");
        BigUint::from_str_radix(stripped, 16)
            .map_err(|e| RouterError::gas_price(format!("eth_gasPrice result is not hex: {}", e)))
    }
}
