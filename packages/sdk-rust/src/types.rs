//! Parameter and result types for the public API.

use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use solana_sdk::pubkey::Pubkey;

use crate::constants::{NATIVE_DECIMALS, NATIVE_MINT, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};
use crate::error::{Error, Result};

// ─── Tokens ───────────────────────────────────────────────────────────────────

/// A token as the caller knows it. The address stays textual until a builder
/// parses it, so malformed input surfaces as [`Error::Validation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub address:  String,
    pub symbol:   String,
    pub decimals: u8,
    pub name:     String,
}

impl TokenDescriptor {
    pub fn new(
        address:  impl Into<String>,
        symbol:   impl Into<String>,
        decimals: u8,
        name:     impl Into<String>,
    ) -> Self {
        Self {
            address:  address.into(),
            symbol:   symbol.into(),
            decimals,
            name:     name.into(),
        }
    }

    /// Native SOL, addressed through its pseudo-mint.
    pub fn native() -> Self {
        Self::new(NATIVE_MINT.to_string(), "SOL", NATIVE_DECIMALS, "Solana")
    }

    /// Parse the textual address.
    pub fn pubkey(&self) -> Result<Pubkey> {
        parse_address(&self.address, &self.symbol)
    }

    /// `true` when the descriptor names the native pseudo-mint.
    pub fn is_native(&self) -> bool {
        self.address.trim() == NATIVE_MINT.to_string()
    }
}

/// Parse a base-58 address, naming `what` in the error message.
pub fn parse_address(text: &str, what: &str) -> Result<Pubkey> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("address for '{what}' is empty")));
    }
    Pubkey::from_str(trimmed)
        .map_err(|e| Error::validation(format!("address '{trimmed}' for '{what}' is malformed: {e}")))
}

/// Serialize a pubkey as base-58 text rather than a byte array.
fn base58<S: Serializer>(key: &Pubkey, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(key)
}

/// Which SPL token program owns a mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenProgram {
    #[default]
    Spl,
    Token2022,
}

impl TokenProgram {
    pub fn id(self) -> Pubkey {
        match self {
            TokenProgram::Spl       => TOKEN_PROGRAM_ID,
            TokenProgram::Token2022 => TOKEN_2022_PROGRAM_ID,
        }
    }
}

// ─── Pools ────────────────────────────────────────────────────────────────────

/// Every address that identifies one pool, in canonical token order.
///
/// Recomputed on demand from the two mints and the program id; callers that
/// want to reuse a pool's addresses keep this value themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolIdentity {
    #[serde(serialize_with = "base58")]
    pub address:   Pubkey,
    pub bump:      u8,
    pub token_a:   TokenDescriptor,
    pub token_b:   TokenDescriptor,
    #[serde(serialize_with = "base58")]
    pub mint_a:    Pubkey,
    #[serde(serialize_with = "base58")]
    pub mint_b:    Pubkey,
    #[serde(serialize_with = "base58")]
    pub lp_mint:   Pubkey,
    #[serde(serialize_with = "base58")]
    pub vault_a:   Pubkey,
    #[serde(serialize_with = "base58")]
    pub vault_b:   Pubkey,
    /// Token A is native SOL.
    pub is_native: bool,
}

// ─── AMM parameters ───────────────────────────────────────────────────────────

/// Parameters for creating a pool and seeding it in the same instruction.
///
/// `amount_a` belongs to `token_a` and `amount_b` to `token_b` in the order
/// given here; canonicalization moves them together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePoolParams {
    pub token_a:  TokenDescriptor,
    pub token_b:  TokenDescriptor,
    pub amount_a: f64,
    pub amount_b: f64,
}

/// Parameters for depositing into an existing pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLiquidityParams {
    pub token_a:  TokenDescriptor,
    pub token_b:  TokenDescriptor,
    pub amount_a: f64,
    pub amount_b: f64,
}

/// Parameters for burning LP tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveLiquidityParams {
    pub token_a:     TokenDescriptor,
    pub token_b:     TokenDescriptor,
    /// Human amount of LP tokens to burn.
    pub lp_amount:   f64,
    /// Decimals of the pool's LP mint.
    pub lp_decimals: u8,
}

/// Parameters for a swap.
///
/// For pairs without SOL the pool is assumed to have been created with
/// `from_token` as token A. Use `TidepoolClient::locate_pool` when that is not
/// known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapParams {
    pub from_token: TokenDescriptor,
    pub to_token:   TokenDescriptor,
    pub amount_in:  f64,
}

// ─── Transfers ────────────────────────────────────────────────────────────────

/// Native SOL transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferParams {
    pub recipient: String,
    /// Amount in SOL.
    pub amount:    f64,
}

/// SPL token transfer between associated token accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTransferParams {
    pub token:         TokenDescriptor,
    pub recipient:     String,
    pub amount:        f64,
    #[serde(default)]
    pub token_program: TokenProgram,
}

// ─── Token / NFT creation ─────────────────────────────────────────────────────

/// A Token-2022 mint with on-mint metadata and an initial supply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTokenParams {
    pub name:           String,
    pub symbol:         String,
    pub uri:            String,
    pub decimals:       u8,
    /// Human amount minted to the recipient's associated account.
    pub initial_supply: f64,
    /// Holder of the initial supply; defaults to the sender.
    #[serde(default)]
    pub recipient:      Option<String>,
}

/// A single-edition Token-2022 NFT (decimals 0, supply 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNftParams {
    pub name:      String,
    pub symbol:    String,
    pub uri:       String,
    #[serde(default)]
    pub recipient: Option<String>,
}

impl From<CreateNftParams> for CreateTokenParams {
    fn from(p: CreateNftParams) -> Self {
        CreateTokenParams {
            name:           p.name,
            symbol:         p.symbol,
            uri:            p.uri,
            decimals:       0,
            initial_supply: 1.0,
            recipient:      p.recipient,
        }
    }
}

// ─── Results ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PoolResult {
    pub signature: String,
    pub pool:      PoolIdentity,
    /// Base units deposited into vault A / vault B (or LP burned, in `amount_a`).
    pub amount_a:  u64,
    pub amount_b:  u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapResult {
    pub signature: String,
    pub pool:      PoolIdentity,
    pub amount_in: u64,
    pub a_to_b:    bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransferResult {
    pub signature: String,
    #[serde(serialize_with = "base58")]
    pub recipient: Pubkey,
    pub amount:    u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResult {
    pub signature:     String,
    #[serde(serialize_with = "base58")]
    pub mint:          Pubkey,
    #[serde(serialize_with = "base58")]
    pub token_account: Pubkey,
    pub supply:        u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_descriptor_is_native() {
        let sol = TokenDescriptor::native();
        assert!(sol.is_native());
        assert_eq!(sol.pubkey().unwrap(), NATIVE_MINT);
    }

    #[test]
    fn malformed_addresses_are_validation_errors() {
        let bad = TokenDescriptor::new("not-a-key", "BAD", 6, "Bad");
        assert!(bad.pubkey().unwrap_err().is_validation());

        let empty = TokenDescriptor::new("  ", "EMPTY", 6, "Empty");
        assert!(empty.pubkey().unwrap_err().is_validation());
    }

    #[test]
    fn descriptor_deserializes_from_json() {
        let json = r#"{"address":"EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                       "symbol":"USDC","decimals":6,"name":"USD Coin"}"#;
        let usdc: TokenDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(usdc.decimals, 6);
        assert!(!usdc.is_native());
    }

    #[test]
    fn results_serialize_keys_as_base58() {
        let mint = Pubkey::new_unique();
        let token_account = Pubkey::new_unique();
        let out = TokenResult { signature: "sig".into(), mint, token_account, supply: 1 };

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["mint"], mint.to_string());
        assert_eq!(json["token_account"], token_account.to_string());
        assert_eq!(json["supply"], 1);
    }

    #[test]
    fn nft_params_become_single_unit_token() {
        let nft = CreateNftParams {
            name: "Tide #1".into(),
            symbol: "TIDE".into(),
            uri: "https://example.com/1.json".into(),
            recipient: None,
        };
        let token: CreateTokenParams = nft.into();
        assert_eq!(token.decimals, 0);
        assert_eq!(token.initial_supply, 1.0);
    }
}
