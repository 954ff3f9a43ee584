mod common;

use solana_sdk::pubkey::Pubkey;
use tidepool_sdk::{
    amm::{build_add_liquidity, build_create_pool, build_swap},
    constants::{AMM_PROGRAM_ID, NATIVE_LP_MINT_SEED, NATIVE_MINT, NATIVE_VAULT_SEED, SYSTEM_PROGRAM_ID},
    instructions::AmmInstruction,
    AddLiquidityParams, BuildContext, CreatePoolParams, SwapParams, TokenDescriptor,
};

use common::USDC;

fn usdc() -> TokenDescriptor {
    TokenDescriptor::new(USDC, "USDC", 6, "USD Coin")
}

fn ctx() -> BuildContext {
    BuildContext::new(Pubkey::new_unique(), AMM_PROGRAM_ID)
}

#[test]
fn sol_usdc_pool_end_to_end() {
    let ctx = ctx();
    let params = CreatePoolParams {
        token_a:  TokenDescriptor::native(),
        token_b:  usdc(),
        amount_a: 1.0,
        amount_b: 100.0,
    };

    let first = build_create_pool(&ctx, &params).unwrap();
    let second = build_create_pool(&ctx, &params).unwrap();

    // Stable across calls, SOL stays in slot A.
    assert_eq!(first.pool, second.pool);
    assert!(first.pool.token_a.is_native());
    assert_eq!(first.pool.mint_a, NATIVE_MINT);

    // Native seeds for vaults and LP mint.
    let pool = first.pool.address;
    let usdc_mint: Pubkey = USDC.parse().unwrap();
    let (vault_a, _) = Pubkey::find_program_address(
        &[NATIVE_VAULT_SEED, pool.as_ref(), NATIVE_MINT.as_ref()],
        &AMM_PROGRAM_ID,
    );
    let (vault_b, _) = Pubkey::find_program_address(
        &[NATIVE_VAULT_SEED, pool.as_ref(), usdc_mint.as_ref()],
        &AMM_PROGRAM_ID,
    );
    let (lp_mint, _) = Pubkey::find_program_address(&[NATIVE_LP_MINT_SEED, pool.as_ref()], &AMM_PROGRAM_ID);
    assert_eq!(first.pool.vault_a, vault_a);
    assert_eq!(first.pool.vault_b, vault_b);
    assert_eq!(first.pool.lp_mint, lp_mint);

    // 17 bytes: discriminator, amount A, amount B.
    let ix = &first.draft.instructions()[0];
    assert_eq!(ix.program_id, AMM_PROGRAM_ID);
    assert_eq!(ix.data.len(), 17);
    assert_eq!(ix.data[0], AmmInstruction::INIT_POOL);
    assert_eq!(u64::from_le_bytes(ix.data[1..9].try_into().unwrap()), 1_000_000_000);
    assert_eq!(u64::from_le_bytes(ix.data[9..17].try_into().unwrap()), 100_000_000);

    // Native pool: 15 accounts, writable signer, trailing system program.
    assert_eq!(ix.accounts.len(), 15);
    assert!(ix.accounts[6].is_signer && ix.accounts[6].is_writable);
    assert_eq!(ix.accounts[6].pubkey, ctx.sender);
    assert_eq!(ix.accounts[7].pubkey, ctx.sender, "SOL is paid from the wallet itself");
    assert_eq!(ix.accounts[14].pubkey, SYSTEM_PROGRAM_ID);

    let json = serde_json::to_value(&first.pool).unwrap();
    assert_eq!(json["address"], pool.to_string());
    assert_eq!(json["lp_mint"], lp_mint.to_string());
}

#[test]
fn native_amount_follows_its_token_whatever_the_order() {
    let ctx = ctx();
    let native_first = build_add_liquidity(&ctx, &AddLiquidityParams {
        token_a: TokenDescriptor::native(), token_b: usdc(), amount_a: 2.0, amount_b: 300.0,
    })
    .unwrap();
    let native_second = build_add_liquidity(&ctx, &AddLiquidityParams {
        token_a: usdc(), token_b: TokenDescriptor::native(), amount_a: 300.0, amount_b: 2.0,
    })
    .unwrap();

    assert_eq!(native_first.pool.address, native_second.pool.address);
    let expected = AmmInstruction::AddLiquidity { amount_a: 2_000_000_000, amount_b: 300_000_000 };
    assert_eq!(native_first.instruction, expected);
    assert_eq!(native_second.instruction, expected);
    assert_eq!(native_first.draft, native_second.draft);
}

#[test]
fn non_native_pair_keeps_caller_order() {
    let ctx = ctx();
    let other = TokenDescriptor::new(Pubkey::new_unique().to_string(), "TIDE", 9, "Tide");
    let ab = build_create_pool(&ctx, &CreatePoolParams {
        token_a: usdc(), token_b: other.clone(), amount_a: 1.0, amount_b: 1.0,
    })
    .unwrap();
    let ba = build_create_pool(&ctx, &CreatePoolParams {
        token_a: other, token_b: usdc(), amount_a: 1.0, amount_b: 1.0,
    })
    .unwrap();

    assert_ne!(ab.pool.address, ba.pool.address);
    assert_eq!(ab.draft.instructions()[0].accounts.len(), 14);
    assert!(!ab.draft.instructions()[0].accounts[6].is_writable);
}

#[test]
fn swap_encodes_direction_and_twelve_accounts() {
    let out = build_swap(&ctx(), &SwapParams {
        from_token: TokenDescriptor::native(),
        to_token:   usdc(),
        amount_in:  0.5,
    })
    .unwrap();

    let ix = &out.draft.instructions()[0];
    let mut expected = vec![AmmInstruction::SWAP];
    expected.extend_from_slice(&500_000_000u64.to_le_bytes());
    expected.push(1);
    assert_eq!(ix.data, expected);
    assert_eq!(ix.accounts.len(), 12);
    assert!(ix.accounts[7].is_signer && !ix.accounts[7].is_writable);
}

#[test]
fn dust_swap_is_rejected_instead_of_moving_nothing() {
    let err = build_swap(&ctx(), &SwapParams {
        from_token: usdc(),
        to_token:   TokenDescriptor::native(),
        amount_in:  0.0000001,
    })
    .unwrap_err();
    assert!(err.is_validation());

    let err = build_add_liquidity(&ctx(), &AddLiquidityParams {
        token_a: TokenDescriptor::native(), token_b: usdc(), amount_a: 1.0, amount_b: 0.0000004,
    })
    .unwrap_err();
    assert!(err.is_validation());
}
