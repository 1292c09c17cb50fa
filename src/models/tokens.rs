use std::collections::HashMap;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::Deserialize;
use tracing::warn;

use crate::errors::RouterError;

/// ERC-20 token metadata. Identity is `(chain_id, address)`; symbol and
/// decimals are carried for display and amount scaling only.
#[derive(Debug, Clone)]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(chain_id: u64, address: Address, symbol: &str, decimals: u8) -> Self {
        Token {
            chain_id,
            address,
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl std::hash::Hash for Token {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

/// A trade endpoint as submitted by the caller. The native coin has no
/// pool representation, so routing always works on its wrapped form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Currency {
    Native { chain_id: u64 },
    Erc20(Token),
}

impl Currency {
    pub fn chain_id(&self) -> u64 {
        match self {
            Currency::Native { chain_id } => *chain_id,
            Currency::Erc20(token) => token.chain_id,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Currency::Native { .. })
    }

    /// The token routing operates on: the wrapped-native token for the
    /// native coin, the token itself otherwise.
    pub fn wrapped(&self) -> Result<Token, RouterError> {
        match self {
            Currency::Erc20(token) => Ok(token.clone()),
            Currency::Native { chain_id } => wrapped_native(*chain_id).ok_or_else(|| {
                RouterError::token_not_found(format!(
                    "No wrapped native token known for chain {}",
                    chain_id
                ))
            }),
        }
    }
}

/// Wrapped native token per supported chain.
pub fn wrapped_native(chain_id: u64) -> Option<Token> {
    let (address, symbol) = match chain_id {
        1 => ("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "WETH"),
        10 => ("0x4200000000000000000000000000000000000006", "WETH"),
        137 => ("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270", "WMATIC"),
        42161 => ("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1", "WETH"),
        _ => return None,
    };
    let address = Address::from_str(address).expect("well-known address");
    Some(Token::new(chain_id, address, symbol, 18))
}

/// One entry of a standard token-list document. Unknown fields are ignored
/// so published lists deserialize as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenListEntry {
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Deserialize)]
pub struct TokenList {
    pub tokens: Vec<TokenListEntry>,
}

/// Long-lived read-only registry resolving tokens by address or symbol for
/// a single chain. Symbol collisions keep the first entry seen.
pub struct TokenRegistry {
    chain_id: u64,
    by_address: HashMap<Address, Token>,
    by_symbol: HashMap<String, Token>,
}

impl TokenRegistry {
    pub fn new(chain_id: u64) -> Self {
        let mut registry = TokenRegistry {
            chain_id,
            by_address: HashMap::new(),
            by_symbol: HashMap::new(),
        };
        if let Some(native) = wrapped_native(chain_id) {
            registry.insert(native);
        }
        registry
    }

    pub fn from_token_list(chain_id: u64, list: TokenList) -> Self {
        let mut registry = TokenRegistry::new(chain_id);
        for entry in list.tokens {
            if entry.chain_id != chain_id {
                continue;
            }
            let address = match Address::from_str(&entry.address) {
                Ok(address) => address,
                Err(e) => {
                    warn!(
                        symbol = entry.symbol.as_str(),
                        "Skipping token list entry with bad address: {}", e
                    );
                    continue;
                }
            };
            registry.insert(Token::new(chain_id, address, &entry.symbol, entry.decimals));
        }
        registry
    }

    pub fn insert(&mut self, token: Token) {
        self.by_symbol
            .entry(token.symbol.clone())
            .or_insert_with(|| token.clone());
        self.by_address.insert(token.address, token);
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn len(&self) -> usize {
        self.by_address.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }

    pub fn by_address(&self, address: &Address) -> Option<&Token> {
        self.by_address.get(address)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.by_symbol.get(symbol)
    }

    /// Resolve a caller-supplied token reference: an address in hex form,
    /// the native coin pseudo-symbols, or a registry symbol.
    pub fn resolve(&self, reference: &str) -> Result<Currency, RouterError> {
        if reference.eq_ignore_ascii_case("eth") || reference.eq_ignore_ascii_case("native") {
            return Ok(Currency::Native {
                chain_id: self.chain_id,
            });
        }
        if reference.starts_with("0x") || reference.starts_with("0X") {
            let address = Address::from_str(reference).map_err(|e| {
                RouterError::token_not_found(format!("Invalid token address {}: {}", reference, e))
            })?;
            return self
                .by_address(&address)
                .cloned()
                .map(Currency::Erc20)
                .ok_or_else(|| {
                    RouterError::token_not_found(format!(
                        "Token {} not present in registry",
                        reference
                    ))
                });
        }
        self.by_symbol(reference)
            .cloned()
            .map(Currency::Erc20)
            .ok_or_else(|| {
                RouterError::token_not_found(format!(
                    "Token symbol {} not present in registry",
                    reference
                ))
            })
    }
}
