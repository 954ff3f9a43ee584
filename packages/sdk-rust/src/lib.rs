//! Tidepool Rust SDK
//!
//! Client-side transaction builders for the Tidepool constant-product AMM on
//! Solana, plus native transfers and Token-2022 token / NFT minting.
//! Pool addresses are derived, never looked up; instruction data and account
//! lists are laid out byte for byte the way the on-chain program reads them.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tidepool_sdk::{CreatePoolParams, TidepoolClient, TokenDescriptor};
//! use solana_sdk::signature::Keypair;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TidepoolClient::devnet();
//!     let sender = Keypair::new(); // use a funded keypair
//!
//!     let usdc = TokenDescriptor::new(
//!         "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC", 6, "USD Coin",
//!     );
//!
//!     // SOL always lands in slot A, whatever order it is given in.
//!     let pool = client.create_pool(&sender, CreatePoolParams {
//!         token_a:  usdc,
//!         token_b:  TokenDescriptor::native(),
//!         amount_a: 100.0,
//!         amount_b: 1.0,
//!     }).await?;
//!     println!("pool {} created in {}", pool.pool.address, pool.signature);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Building without sending
//!
//! The builders in [`amm`] are pure and return a [`TxDraft`]; sign it with
//! [`signing::sign_with_keypairs`] or any [`WalletAdapter`] and submit it with
//! [`submit::send_and_confirm`].
//!
//! # Feature Overview
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`TidepoolClient::create_pool`] | Create a pool and make the first deposit |
//! | [`TidepoolClient::add_liquidity`] | Deposit both tokens of a pair |
//! | [`TidepoolClient::remove_liquidity`] | Burn LP tokens |
//! | [`TidepoolClient::swap`] | Swap through a derived pool |
//! | [`TidepoolClient::locate_pool`] | Resolve a pool's stored token order on-chain |
//! | [`TidepoolClient::transfer_sol`] | Native SOL transfer |
//! | [`TidepoolClient::transfer_token`] | SPL token transfer |
//! | [`TidepoolClient::create_token`] | Token-2022 mint with on-mint metadata |
//! | [`TidepoolClient::create_nft`] | One-of-one NFT |
//! | [`TidepoolClient::create_tokens`] | Sequential batch of token mints |

pub mod amm;
pub mod amount;
pub mod assembler;
pub mod batch;
pub mod canonical;
pub mod client;
pub mod constants;
pub mod error;
pub mod instructions;
pub mod metadata;
pub mod pda;
pub mod rpc;
pub mod signing;
pub mod submit;
pub mod token;
pub mod types;

pub use assembler::{BuildContext, TxDraft};
pub use client::TidepoolClient;
pub use error::{Error, Result};
pub use rpc::{ChainRpc, ConfirmLevel, SignatureStatus, Simulation};
pub use signing::WalletAdapter;
pub use submit::ConfirmOptions;
pub use types::*;
