//! Pool, liquidity and swap transaction builders.
//!
//! Pure: no network I/O. Pool and vault addresses are derived, never looked
//! up. Every builder runs the same pipeline: validate amounts → canonical
//! order → derive addresses → base units → encode → draft.

use solana_sdk::pubkey::Pubkey;

use crate::amount::{ensure_positive, normalize, to_base_units};
use crate::assembler::{BuildContext, TxDraft};
use crate::canonical::canonicalize;
use crate::error::{Error, Result};
use crate::instructions::{
    add_liquidity_ix, init_pool_ix, remove_liquidity_ix, swap_ix, AmmInstruction,
    LiquidityAccounts, SwapAccounts,
};
use crate::pda::derive_pool_identity;
use crate::types::{
    AddLiquidityParams, CreatePoolParams, PoolIdentity, RemoveLiquidityParams, SwapParams,
    TokenDescriptor,
};

/// A pool-touching draft together with what went into it.
#[derive(Debug, Clone)]
pub struct AmmDraft {
    pub draft:       TxDraft,
    pub pool:        PoolIdentity,
    pub instruction: AmmInstruction,
}

enum Deposit {
    Create,
    Add,
}

fn build_deposit(
    ctx:      &BuildContext,
    token_a:  &TokenDescriptor,
    token_b:  &TokenDescriptor,
    amount_a: f64,
    amount_b: f64,
    kind:     Deposit,
) -> Result<AmmDraft> {
    ensure_positive(amount_a, "amount_a")?;
    ensure_positive(amount_b, "amount_b")?;

    let pair = canonicalize(token_a, token_b)?;
    let pool = derive_pool_identity(&pair, &ctx.program_id);

    let (human_a, human_b) = pair.arrange(amount_a, amount_b);
    let base_a = normalize(human_a, &pool.token_a)?;
    let base_b = normalize(human_b, &pool.token_b)?;

    let accounts = LiquidityAccounts::for_pool(&pool, &ctx.sender);
    let (ix, instruction) = match kind {
        Deposit::Create => (
            init_pool_ix(&ctx.program_id, accounts, base_a, base_b)?,
            AmmInstruction::InitPool { amount_a: base_a, amount_b: base_b },
        ),
        Deposit::Add => (
            add_liquidity_ix(&ctx.program_id, accounts, base_a, base_b)?,
            AmmInstruction::AddLiquidity { amount_a: base_a, amount_b: base_b },
        ),
    };

    let mut draft = TxDraft::for_context(ctx);
    draft.push(ix);

    log::debug!("{instruction:?} on pool {} ({} accounts)", pool.address, draft.instructions()[0].accounts.len());
    Ok(AmmDraft { draft, pool, instruction })
}

/// Create a pool and make its first deposit.
pub fn build_create_pool(ctx: &BuildContext, params: &CreatePoolParams) -> Result<AmmDraft> {
    build_deposit(ctx, &params.token_a, &params.token_b, params.amount_a, params.amount_b, Deposit::Create)
}

/// Deposit both tokens into an existing pool.
pub fn build_add_liquidity(ctx: &BuildContext, params: &AddLiquidityParams) -> Result<AmmDraft> {
    build_deposit(ctx, &params.token_a, &params.token_b, params.amount_a, params.amount_b, Deposit::Add)
}

/// Burn LP tokens for a proportional share of both vaults.
pub fn build_remove_liquidity(ctx: &BuildContext, params: &RemoveLiquidityParams) -> Result<AmmDraft> {
    ensure_positive(params.lp_amount, "lp_amount")?;

    let pair = canonicalize(&params.token_a, &params.token_b)?;
    let pool = derive_pool_identity(&pair, &ctx.program_id);
    let lp_amount = to_base_units(params.lp_amount, params.lp_decimals)?;

    let ix = remove_liquidity_ix(&ctx.program_id, LiquidityAccounts::for_pool(&pool, &ctx.sender), lp_amount)?;
    let mut draft = TxDraft::for_context(ctx);
    draft.push(ix);

    Ok(AmmDraft { draft, pool, instruction: AmmInstruction::RemoveLiquidity { lp_amount } })
}

/// Swap through the pool the pair canonicalizes to.
///
/// For pairs without SOL this is the pool created with `from_token` as token
/// A; when the stored order is not known, resolve it first with
/// `TidepoolClient::locate_pool` and call [`build_swap_in_pool`].
pub fn build_swap(ctx: &BuildContext, params: &SwapParams) -> Result<AmmDraft> {
    ensure_positive(params.amount_in, "amount_in")?;

    let pair = canonicalize(&params.from_token, &params.to_token)?;
    let pool = derive_pool_identity(&pair, &ctx.program_id);
    build_swap_in_pool(ctx, &pool, &params.from_token, params.amount_in)
}

/// Swap `amount_in` of `from_token` through a known pool.
pub fn build_swap_in_pool(
    ctx:        &BuildContext,
    pool:       &PoolIdentity,
    from_token: &TokenDescriptor,
    amount_in:  f64,
) -> Result<AmmDraft> {
    ensure_positive(amount_in, "amount_in")?;

    let mint_from = from_token.pubkey()?;
    let (a_to_b, mint_to): (bool, Pubkey) = if mint_from == pool.mint_a {
        (true, pool.mint_b)
    } else if mint_from == pool.mint_b {
        (false, pool.mint_a)
    } else {
        return Err(Error::validation(format!(
            "{} is not a token of pool {}",
            from_token.symbol, pool.address
        )));
    };

    let amount = normalize(amount_in, from_token)?;
    let accounts = SwapAccounts::for_pool(pool, &ctx.sender, &mint_from, &mint_to);
    let ix = swap_ix(&ctx.program_id, accounts, amount, a_to_b)?;

    let mut draft = TxDraft::for_context(ctx);
    draft.push(ix);

    log::debug!("swap {amount} {} on pool {} (a_to_b={a_to_b})", from_token.symbol, pool.address);
    Ok(AmmDraft {
        draft,
        pool: pool.clone(),
        instruction: AmmInstruction::Swap { amount_in: amount, a_to_b },
    })
}
