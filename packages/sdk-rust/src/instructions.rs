//! Low-level instruction builders for the Tidepool AMM program.
//!
//! Each function constructs a [`solana_sdk::instruction::Instruction`] ready
//! for a transaction. Account order is the program's wire contract and must
//! match exactly; the same set in a different order is a different call.
//!
//! Instruction data is a one-byte discriminator followed by little-endian
//! fixed-width fields:
//!
//! ```text
//! InitPool        0 | amount_a u64 | amount_b u64    17 bytes
//! AddLiquidity    1 | amount_a u64 | amount_b u64    17 bytes
//! RemoveLiquidity 2 | lp_amount u64                   9 bytes
//! Swap            3 | amount_in u64 | a_to_b u8      10 bytes
//! ```

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::constants::{
    ASSOCIATED_TOKEN_PROGRAM_ID, LIQUIDITY_ACCOUNT_COUNT, NATIVE_LIQUIDITY_ACCOUNT_COUNT,
    RENT_SYSVAR_ID, SWAP_ACCOUNT_COUNT, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use crate::error::{Error, Result};
use crate::pda::{derive_ata, user_token_account};
use crate::types::PoolIdentity;

// ─── Instruction data ─────────────────────────────────────────────────────────

/// Every instruction the AMM program accepts, with only the fields it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmInstruction {
    InitPool { amount_a: u64, amount_b: u64 },
    AddLiquidity { amount_a: u64, amount_b: u64 },
    RemoveLiquidity { lp_amount: u64 },
    Swap { amount_in: u64, a_to_b: bool },
}

impl AmmInstruction {
    pub const INIT_POOL: u8 = 0;
    pub const ADD_LIQUIDITY: u8 = 1;
    pub const REMOVE_LIQUIDITY: u8 = 2;
    pub const SWAP: u8 = 3;

    pub fn discriminator(&self) -> u8 {
        match self {
            AmmInstruction::InitPool { .. }        => Self::INIT_POOL,
            AmmInstruction::AddLiquidity { .. }    => Self::ADD_LIQUIDITY,
            AmmInstruction::RemoveLiquidity { .. } => Self::REMOVE_LIQUIDITY,
            AmmInstruction::Swap { .. }            => Self::SWAP,
        }
    }

    /// Encoded length for a discriminator, or `None` if the program has no such op.
    pub fn packed_len_of(discriminator: u8) -> Option<usize> {
        match discriminator {
            Self::INIT_POOL | Self::ADD_LIQUIDITY => Some(17),
            Self::REMOVE_LIQUIDITY                => Some(9),
            Self::SWAP                            => Some(10),
            _                                     => None,
        }
    }

    pub fn packed_len(&self) -> usize {
        match self {
            AmmInstruction::InitPool { .. } | AmmInstruction::AddLiquidity { .. } => 17,
            AmmInstruction::RemoveLiquidity { .. } => 9,
            AmmInstruction::Swap { .. } => 10,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.packed_len());
        data.push(self.discriminator());
        match *self {
            AmmInstruction::InitPool { amount_a, amount_b }
            | AmmInstruction::AddLiquidity { amount_a, amount_b } => {
                data.extend_from_slice(&amount_a.to_le_bytes());
                data.extend_from_slice(&amount_b.to_le_bytes());
            }
            AmmInstruction::RemoveLiquidity { lp_amount } => {
                data.extend_from_slice(&lp_amount.to_le_bytes());
            }
            AmmInstruction::Swap { amount_in, a_to_b } => {
                data.extend_from_slice(&amount_in.to_le_bytes());
                data.push(a_to_b as u8);
            }
        }
        debug_assert_eq!(data.len(), self.packed_len());
        data
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        let (&tag, rest) = data
            .split_first()
            .ok_or_else(|| Error::encoding("instruction data is empty"))?;
        let expected = Self::packed_len_of(tag)
            .ok_or_else(|| Error::encoding(format!("unknown discriminator {tag}")))?;
        if data.len() != expected {
            return Err(Error::encoding(format!(
                "discriminator {tag} needs {expected} bytes, got {}",
                data.len()
            )));
        }

        Ok(match tag {
            Self::INIT_POOL => AmmInstruction::InitPool {
                amount_a: read_u64(rest, 0)?,
                amount_b: read_u64(rest, 8)?,
            },
            Self::ADD_LIQUIDITY => AmmInstruction::AddLiquidity {
                amount_a: read_u64(rest, 0)?,
                amount_b: read_u64(rest, 8)?,
            },
            Self::REMOVE_LIQUIDITY => AmmInstruction::RemoveLiquidity {
                lp_amount: read_u64(rest, 0)?,
            },
            Self::SWAP => AmmInstruction::Swap {
                amount_in: read_u64(rest, 0)?,
                a_to_b: match rest[8] {
                    0 => false,
                    1 => true,
                    other => {
                        return Err(Error::encoding(format!("direction byte must be 0 or 1, got {other}")))
                    }
                },
            },
            _ => unreachable!("length table covers every discriminator"),
        })
    }
}

fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    let b: [u8; 8] = data
        .get(offset..offset + 8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::encoding(format!("slice too short for u64 at offset {offset}")))?;
    Ok(u64::from_le_bytes(b))
}

// ─── Account lists ────────────────────────────────────────────────────────────

/// Accounts shared by `InitPool`, `AddLiquidity` and `RemoveLiquidity`.
#[derive(Debug, Clone)]
pub struct LiquidityAccounts {
    pub pool:         Pubkey,
    pub mint_a:       Pubkey,
    pub mint_b:       Pubkey,
    pub vault_a:      Pubkey,
    pub vault_b:      Pubkey,
    pub lp_mint:      Pubkey,
    pub user:         Pubkey,
    pub user_token_a: Pubkey,
    pub user_token_b: Pubkey,
    pub user_lp:      Pubkey,
    pub native_pool:  bool,
}

impl LiquidityAccounts {
    /// Resolve the user-side accounts for `user` against a derived pool.
    pub fn for_pool(pool: &PoolIdentity, user: &Pubkey) -> Self {
        Self {
            pool:         pool.address,
            mint_a:       pool.mint_a,
            mint_b:       pool.mint_b,
            vault_a:      pool.vault_a,
            vault_b:      pool.vault_b,
            lp_mint:      pool.lp_mint,
            user:         *user,
            user_token_a: user_token_account(user, &pool.mint_a),
            user_token_b: user_token_account(user, &pool.mint_b),
            user_lp:      derive_ata(user, &pool.lp_mint, &TOKEN_PROGRAM_ID),
            native_pool:  pool.is_native,
        }
    }

    pub fn expected_len(&self) -> usize {
        if self.native_pool {
            NATIVE_LIQUIDITY_ACCOUNT_COUNT
        } else {
            LIQUIDITY_ACCOUNT_COUNT
        }
    }
}

impl From<LiquidityAccounts> for Vec<AccountMeta> {
    fn from(accounts: LiquidityAccounts) -> Self {
        // SOL moves straight out of the signer's wallet in native pools.
        let signer = if accounts.native_pool {
            AccountMeta::new(accounts.user, true)
        } else {
            AccountMeta::new_readonly(accounts.user, true)
        };

        let mut metas = vec![
            AccountMeta::new(accounts.pool,          false),
            AccountMeta::new_readonly(accounts.mint_a, false),
            AccountMeta::new_readonly(accounts.mint_b, false),
            AccountMeta::new(accounts.vault_a,       false),
            AccountMeta::new(accounts.vault_b,       false),
            AccountMeta::new(accounts.lp_mint,       false),
            signer,
            AccountMeta::new(accounts.user_token_a,  false),
            AccountMeta::new(accounts.user_token_b,  false),
            AccountMeta::new(accounts.user_lp,       false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID,            false),
            AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID,           false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID,              false),
        ];
        if accounts.native_pool {
            metas.push(AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false));
        }
        metas
    }
}

/// Accounts for `Swap`. Vaults are always passed in pool (A, B) order; the
/// direction byte tells the program which way tokens move.
#[derive(Debug, Clone)]
pub struct SwapAccounts {
    pub pool:      Pubkey,
    pub mint_a:    Pubkey,
    pub mint_b:    Pubkey,
    pub vault_a:   Pubkey,
    pub vault_b:   Pubkey,
    pub user_from: Pubkey,
    pub user_to:   Pubkey,
    pub user:      Pubkey,
}

impl SwapAccounts {
    /// Resolve user accounts for a trade of `mint_from` into `mint_to`.
    pub fn for_pool(pool: &PoolIdentity, user: &Pubkey, mint_from: &Pubkey, mint_to: &Pubkey) -> Self {
        Self {
            pool:      pool.address,
            mint_a:    pool.mint_a,
            mint_b:    pool.mint_b,
            vault_a:   pool.vault_a,
            vault_b:   pool.vault_b,
            user_from: user_token_account(user, mint_from),
            user_to:   user_token_account(user, mint_to),
            user:      *user,
        }
    }
}

impl From<SwapAccounts> for Vec<AccountMeta> {
    fn from(accounts: SwapAccounts) -> Self {
        vec![
            AccountMeta::new(accounts.pool,            false),
            AccountMeta::new_readonly(accounts.mint_a, false),
            AccountMeta::new_readonly(accounts.mint_b, false),
            AccountMeta::new(accounts.vault_a,         false),
            AccountMeta::new(accounts.vault_b,         false),
            AccountMeta::new(accounts.user_from,       false),
            AccountMeta::new(accounts.user_to,         false),
            AccountMeta::new_readonly(accounts.user,   true),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID,            false),
            AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID,           false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID,              false),
        ]
    }
}

// ─── Builders ─────────────────────────────────────────────────────────────────

fn assemble(
    program_id: &Pubkey,
    accounts:   Vec<AccountMeta>,
    expected:   usize,
    data:       AmmInstruction,
) -> Result<Instruction> {
    if accounts.len() != expected {
        return Err(Error::encoding(format!(
            "{:?} expects {expected} accounts, assembled {}",
            data,
            accounts.len()
        )));
    }
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: data.pack(),
    })
}

/// Build the `InitPool` instruction (creates the pool and makes the first deposit).
pub fn init_pool_ix(
    program_id: &Pubkey,
    accounts:   LiquidityAccounts,
    amount_a:   u64,
    amount_b:   u64,
) -> Result<Instruction> {
    let expected = accounts.expected_len();
    assemble(program_id, accounts.into(), expected, AmmInstruction::InitPool { amount_a, amount_b })
}

/// Build the `AddLiquidity` instruction.
pub fn add_liquidity_ix(
    program_id: &Pubkey,
    accounts:   LiquidityAccounts,
    amount_a:   u64,
    amount_b:   u64,
) -> Result<Instruction> {
    let expected = accounts.expected_len();
    assemble(program_id, accounts.into(), expected, AmmInstruction::AddLiquidity { amount_a, amount_b })
}

/// Build the `RemoveLiquidity` instruction.
pub fn remove_liquidity_ix(
    program_id: &Pubkey,
    accounts:   LiquidityAccounts,
    lp_amount:  u64,
) -> Result<Instruction> {
    let expected = accounts.expected_len();
    assemble(program_id, accounts.into(), expected, AmmInstruction::RemoveLiquidity { lp_amount })
}

/// Build the `Swap` instruction.
pub fn swap_ix(
    program_id: &Pubkey,
    accounts:   SwapAccounts,
    amount_in:  u64,
    a_to_b:     bool,
) -> Result<Instruction> {
    assemble(program_id, accounts.into(), SWAP_ACCOUNT_COUNT, AmmInstruction::Swap { amount_in, a_to_b })
}
