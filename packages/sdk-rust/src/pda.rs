//! Program-derived addresses for pools, vaults and LP mints.
//!
//! Seeds mirror the on-chain program byte for byte; mints and pools are fed
//! in as their raw 32-byte keys.

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address_with_program_id;

use crate::amount::is_native_mint;
use crate::canonical::CanonicalPair;
use crate::constants::{
    LP_MINT_SEED, NATIVE_LP_MINT_SEED, NATIVE_VAULT_SEED, POOL_SEED,
    TOKEN_PROGRAM_ID, VAULT_SEED,
};
use crate::error::Result;
use crate::types::{parse_address, PoolIdentity};

/// Derive the pool PDA for a canonical mint pair.
pub fn derive_pool(mint_a: &Pubkey, mint_b: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_SEED, mint_a.as_ref(), mint_b.as_ref()], program_id)
}

/// [`derive_pool`] for textual addresses; malformed input is a validation error.
pub fn derive_pool_from_str(mint_a: &str, mint_b: &str, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    let a = parse_address(mint_a, "token A")?;
    let b = parse_address(mint_b, "token B")?;
    Ok(derive_pool(&a, &b, program_id))
}

/// Derive the vault holding `mint` for `pool`.
pub fn derive_vault(pool: &Pubkey, mint: &Pubkey, native_pool: bool, program_id: &Pubkey) -> (Pubkey, u8) {
    let seed = if native_pool { NATIVE_VAULT_SEED } else { VAULT_SEED };
    Pubkey::find_program_address(&[seed, pool.as_ref(), mint.as_ref()], program_id)
}

/// Derive the LP mint for `pool`.
pub fn derive_lp_mint(pool: &Pubkey, native_pool: bool, program_id: &Pubkey) -> (Pubkey, u8) {
    let seed = if native_pool { NATIVE_LP_MINT_SEED } else { LP_MINT_SEED };
    Pubkey::find_program_address(&[seed, pool.as_ref()], program_id)
}

/// Derive the Associated Token Account for a wallet + mint under `token_program`.
pub fn derive_ata(wallet: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(wallet, mint, token_program)
}

/// The account a user trades `mint` from: their SPL ATA, or the wallet itself for SOL.
pub fn user_token_account(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    if is_native_mint(mint) {
        *owner
    } else {
        derive_ata(owner, mint, &TOKEN_PROGRAM_ID)
    }
}

/// Every pool address for a canonical pair.
pub fn derive_pool_identity(pair: &CanonicalPair, program_id: &Pubkey) -> PoolIdentity {
    let (address, bump) = derive_pool(&pair.mint_a, &pair.mint_b, program_id);
    let (vault_a, _)    = derive_vault(&address, &pair.mint_a, pair.is_native, program_id);
    let (vault_b, _)    = derive_vault(&address, &pair.mint_b, pair.is_native, program_id);
    let (lp_mint, _)    = derive_lp_mint(&address, pair.is_native, program_id);

    log::debug!(
        "pool {}-{} → {address} (bump {bump}, native={})",
        pair.token_a.symbol,
        pair.token_b.symbol,
        pair.is_native
    );

    PoolIdentity {
        address,
        bump,
        token_a: pair.token_a.clone(),
        token_b: pair.token_b.clone(),
        mint_a: pair.mint_a,
        mint_b: pair.mint_b,
        lp_mint,
        vault_a,
        vault_b,
        is_native: pair.is_native,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::canonicalize;
    use crate::constants::{AMM_PROGRAM_ID, NATIVE_MINT};
    use crate::types::TokenDescriptor;

    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn usdc() -> TokenDescriptor {
        TokenDescriptor::new(USDC, "USDC", 6, "USD Coin")
    }

    #[test]
    fn pool_derivation_is_deterministic() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        assert_eq!(derive_pool(&a, &b, &AMM_PROGRAM_ID), derive_pool(&a, &b, &AMM_PROGRAM_ID));
        assert_ne!(derive_pool(&a, &b, &AMM_PROGRAM_ID).0, derive_pool(&b, &a, &AMM_PROGRAM_ID).0);
    }

    #[test]
    fn derived_pool_is_off_curve() {
        let (pool, _) = derive_pool(&NATIVE_MINT, &Pubkey::new_unique(), &AMM_PROGRAM_ID);
        assert!(!pool.is_on_curve());
    }

    #[test]
    fn textual_derivation_matches_and_validates() {
        let usdc_key: Pubkey = USDC.parse().unwrap();
        let expected = derive_pool(&NATIVE_MINT, &usdc_key, &AMM_PROGRAM_ID);
        let got = derive_pool_from_str(&NATIVE_MINT.to_string(), USDC, &AMM_PROGRAM_ID).unwrap();
        assert_eq!(got, expected);

        assert!(derive_pool_from_str("nope", USDC, &AMM_PROGRAM_ID).unwrap_err().is_validation());
        assert!(derive_pool_from_str("", USDC, &AMM_PROGRAM_ID).unwrap_err().is_validation());
    }

    #[test]
    fn native_pools_use_native_seeds() {
        let pair = canonicalize(&TokenDescriptor::native(), &usdc()).unwrap();
        let id = derive_pool_identity(&pair, &AMM_PROGRAM_ID);

        let (vault_a, _) = Pubkey::find_program_address(
            &[b"native_sol_vault", id.address.as_ref(), NATIVE_MINT.as_ref()],
            &AMM_PROGRAM_ID,
        );
        let (lp_mint, _) = Pubkey::find_program_address(
            &[b"native_sol_lp_mint", id.address.as_ref()],
            &AMM_PROGRAM_ID,
        );
        assert_eq!(id.vault_a, vault_a);
        assert_eq!(id.lp_mint, lp_mint);
    }

    #[test]
    fn plain_pools_use_plain_seeds() {
        let other = TokenDescriptor::new(Pubkey::new_unique().to_string(), "OTH", 9, "Other");
        let pair = canonicalize(&other, &usdc()).unwrap();
        let id = derive_pool_identity(&pair, &AMM_PROGRAM_ID);

        let (vault_b, _) = Pubkey::find_program_address(
            &[b"vault", id.address.as_ref(), pair.mint_b.as_ref()],
            &AMM_PROGRAM_ID,
        );
        let (lp_mint, _) = Pubkey::find_program_address(&[b"mint", id.address.as_ref()], &AMM_PROGRAM_ID);
        assert_eq!(id.vault_b, vault_b);
        assert_eq!(id.lp_mint, lp_mint);
        assert!(!id.is_native);
    }

    #[test]
    fn user_account_is_wallet_for_native() {
        let owner = Pubkey::new_unique();
        assert_eq!(user_token_account(&owner, &NATIVE_MINT), owner);

        let mint: Pubkey = USDC.parse().unwrap();
        assert_eq!(user_token_account(&owner, &mint), derive_ata(&owner, &mint, &TOKEN_PROGRAM_ID));
        assert_ne!(user_token_account(&owner, &mint), owner);
    }

    #[test]
    fn ata_seeds_include_the_token_program() {
        use crate::constants::{ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID};

        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let (expected, _) = Pubkey::find_program_address(
            &[owner.as_ref(), TOKEN_2022_PROGRAM_ID.as_ref(), mint.as_ref()],
            &ASSOCIATED_TOKEN_PROGRAM_ID,
        );
        assert_eq!(derive_ata(&owner, &mint, &TOKEN_2022_PROGRAM_ID), expected);
        assert_ne!(derive_ata(&owner, &mint, &TOKEN_PROGRAM_ID), expected);
    }
}
