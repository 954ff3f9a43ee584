//! Wire-format constants shared with the on-chain Tidepool program.
//!
//! Every value here is part of the contract with a program this crate does
//! not control; changing any of them breaks interoperability.

use std::time::Duration;

use solana_sdk::{pubkey, pubkey::Pubkey};

// ─── Program IDs ──────────────────────────────────────────────────────────────

/// Default Tidepool AMM program (override with `TidepoolClient::with_program_id`).
pub const AMM_PROGRAM_ID: Pubkey = pubkey!("DyVZqVFbSHRsoGwsW9jUyrTC1souxcJDkqbLQmMqn42b");

/// Classic SPL Token program. Pool vaults, LP mints and user accounts live here.
pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Token-2022 program, used by the token / NFT creation flows.
pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Associated Token Account program.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// System program, hardcoded since `solana_sdk::system_program` is deprecated.
pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111");

/// Rent sysvar.
pub const RENT_SYSVAR_ID: Pubkey = pubkey!("SysvarRent111111111111111111111111111111111");

/// Pseudo-mint that stands for native SOL inside pool and swap logic.
pub const NATIVE_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

// ─── PDA seeds ────────────────────────────────────────────────────────────────

pub const POOL_SEED:             &[u8] = b"pool";
pub const VAULT_SEED:            &[u8] = b"vault";
pub const LP_MINT_SEED:          &[u8] = b"mint";
pub const NATIVE_VAULT_SEED:     &[u8] = b"native_sol_vault";
pub const NATIVE_LP_MINT_SEED:   &[u8] = b"native_sol_lp_mint";

// ─── Amounts ──────────────────────────────────────────────────────────────────

/// Base-unit exponent of SOL (1 SOL = 10^9 lamports).
pub const NATIVE_DECIMALS: u8 = 9;

// ─── Account-list sizes expected by the program ───────────────────────────────

pub const SWAP_ACCOUNT_COUNT:        usize = 12;
pub const LIQUIDITY_ACCOUNT_COUNT:   usize = 14;
/// Native pools carry a trailing second system-program reference.
pub const NATIVE_LIQUIDITY_ACCOUNT_COUNT: usize = 15;

// ─── Network defaults ─────────────────────────────────────────────────────────

pub const DEVNET_RPC:  &str = "https://api.devnet.solana.com";
pub const MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";

pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL:   Duration = Duration::from_secs(1);
