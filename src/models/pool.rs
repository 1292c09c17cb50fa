use alloy_primitives::{keccak256, Address, U256};
use num_bigint::BigUint;
use serde::Deserialize;

use super::tokens::Token;

/// Fee tiers deployed by the factory, in hundredths of a bip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeTier {
    Lowest,
    Low,
    Medium,
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 4] = [FeeTier::Lowest, FeeTier::Low, FeeTier::Medium, FeeTier::High];

    pub fn as_u32(self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3_000,
            FeeTier::High => 10_000,
        }
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            100 => Some(FeeTier::Lowest),
            500 => Some(FeeTier::Low),
            3_000 => Some(FeeTier::Medium),
            10_000 => Some(FeeTier::High),
            _ => None,
        }
    }

    pub fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Lowest => 1,
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }
}

pub const FACTORY_ADDRESS: &str = "0x1F98431c8aD98523631AE4a59f267346ea31F984";
pub const POOL_INIT_CODE_HASH: &str =
    "0xe34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54";

/// Deterministic pool address for a canonically ordered token pair and fee,
/// via the factory's CREATE2 derivation.
pub fn compute_pool_address(token0: &Address, token1: &Address, fee: FeeTier) -> Address {
    debug_assert!(token0 < token1, "tokens must be canonically ordered");

    let mut salt_preimage = [0u8; 96];
    salt_preimage[12..32].copy_from_slice(token0.as_slice());
    salt_preimage[44..64].copy_from_slice(token1.as_slice());
    let fee_word = U256::from(fee.as_u32()).to_be_bytes::<32>();
    salt_preimage[64..96].copy_from_slice(&fee_word);
    let salt = keccak256(salt_preimage);

    let factory: Address = FACTORY_ADDRESS.parse().expect("well-known factory address");
    let init_code_hash: [u8; 32] = {
        let stripped = POOL_INIT_CODE_HASH.trim_start_matches("0x");
        let bytes = alloy_primitives::hex::decode(stripped).expect("well-known init code hash");
        bytes.try_into().expect("32-byte hash")
    };

    let mut preimage = [0u8; 85];
    preimage[0] = 0xff;
    preimage[1..21].copy_from_slice(factory.as_slice());
    preimage[21..53].copy_from_slice(salt.as_slice());
    preimage[53..85].copy_from_slice(&init_code_hash);
    Address::from_slice(&keccak256(preimage)[12..])
}

/// Live pool state. `token0.address < token1.address` always holds; use
/// [`Pool::new`] to get the ordering right from arbitrary input.
#[derive(Debug, Clone)]
pub struct Pool {
    pub token0: Token,
    pub token1: Token,
    pub fee: FeeTier,
    pub liquidity: BigUint,
    pub sqrt_price_x96: BigUint,
    pub tick: i32,
    pub address: Address,
}

impl Pool {
    pub fn new(
        token_a: Token,
        token_b: Token,
        fee: FeeTier,
        liquidity: BigUint,
        sqrt_price_x96: BigUint,
        tick: i32,
    ) -> Self {
        let (token0, token1) = if token_a.address < token_b.address {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        let address = compute_pool_address(&token0.address, &token1.address, fee);
        Pool {
            token0,
            token1,
            fee,
            liquidity,
            sqrt_price_x96,
            tick,
            address,
        }
    }

    pub fn involves(&self, token: &Token) -> bool {
        self.token0 == *token || self.token1 == *token
    }

    /// The opposite endpoint of `token`, or `None` if the pool does not
    /// contain it.
    pub fn counterparty(&self, token: &Token) -> Option<&Token> {
        if self.token0 == *token {
            Some(&self.token1)
        } else if self.token1 == *token {
            Some(&self.token0)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubgraphToken {
    pub id: String,
    pub symbol: String,
}

/// One pool of the universe snapshot as the subgraph reports it. `id` is
/// the on-chain pool address in lowercase hex; numeric fields arrive as
/// strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphPool {
    pub id: String,
    pub token0: SubgraphToken,
    pub token1: SubgraphToken,
    pub fee_tier: String,
    #[serde(rename = "totalValueLockedUSD")]
    pub total_value_locked_usd: String,
}

impl SubgraphPool {
    pub fn fee(&self) -> Option<FeeTier> {
        self.fee_tier.parse::<u32>().ok().and_then(FeeTier::from_u32)
    }

    /// TVL is a ranking heuristic only and never enters quote arithmetic,
    /// so lossy float parsing is acceptable here.
    pub fn tvl_usd(&self) -> f64 {
        self.total_value_locked_usd.parse::<f64>().unwrap_or(0.0)
    }
}
