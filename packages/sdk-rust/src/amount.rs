//! Human amount → base-unit conversion.
//!
//! `floor(amount × 10^decimals)` computed in exact decimal arithmetic, so
//! `0.000001` at 6 decimals is exactly one base unit rather than whatever the
//! nearest binary float times a million happens to be.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

use crate::constants::{NATIVE_DECIMALS, NATIVE_MINT};
use crate::error::{Error, Result};
use crate::types::TokenDescriptor;

/// `true` if `mint` is the native SOL pseudo-mint.
pub fn is_native_mint(mint: &Pubkey) -> bool {
    *mint == NATIVE_MINT
}

/// First gate of every builder: the amount must be a finite number above zero.
pub fn ensure_positive(amount: f64, what: &str) -> Result<()> {
    if !amount.is_finite() {
        return Err(Error::validation(format!("{what} must be a finite number, got {amount}")));
    }
    if amount <= 0.0 {
        return Err(Error::validation(format!("{what} must be > 0, got {amount}")));
    }
    Ok(())
}

/// Convert `amount` to base units at `decimals`.
pub fn to_base_units(amount: f64, decimals: u8) -> Result<u64> {
    ensure_positive(amount, "amount")?;

    let value = Decimal::from_f64(amount)
        .ok_or_else(|| Error::validation(format!("amount {amount} is out of range")))?;

    let mut scaled = value;
    for _ in 0..decimals {
        scaled = scaled.checked_mul(Decimal::TEN).ok_or_else(|| {
            Error::validation(format!("amount {amount} at {decimals} decimals overflows"))
        })?;
    }

    let base = scaled
        .floor()
        .to_u64()
        .ok_or_else(|| Error::validation(format!("amount {amount} at {decimals} decimals exceeds u64")))?;
    if base == 0 {
        return Err(Error::validation(format!(
            "amount {amount} is below one base unit at {decimals} decimals"
        )));
    }
    Ok(base)
}

/// Convert `amount` of `token` to base units; SOL always uses 9 decimals.
pub fn normalize(amount: f64, token: &TokenDescriptor) -> Result<u64> {
    to_base_units(amount, effective_decimals(token))
}

/// Decimals used for `token`'s base units.
pub fn effective_decimals(token: &TokenDescriptor) -> u8 {
    if token.is_native() {
        NATIVE_DECIMALS
    } else {
        token.decimals
    }
}
