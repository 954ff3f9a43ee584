//! Token ordering for pools.
//!
//! The one place that decides which token is "A". If exactly one side is
//! native SOL it is always A; otherwise the caller's order stands. Anything
//! that travels with a token (its amount, its user account) must be passed
//! through [`CanonicalPair::arrange`] so it can never be separated from it.

use solana_sdk::pubkey::Pubkey;

use crate::amount::is_native_mint;
use crate::error::{Error, Result};
use crate::types::TokenDescriptor;

/// Two tokens in canonical pool order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPair {
    pub token_a:   TokenDescriptor,
    pub token_b:   TokenDescriptor,
    pub mint_a:    Pubkey,
    pub mint_b:    Pubkey,
    /// The caller's second token became A.
    pub swapped:   bool,
    /// Token A is native SOL.
    pub is_native: bool,
}

impl CanonicalPair {
    /// Reorder a value pair given in the caller's token order.
    pub fn arrange<T>(&self, first: T, second: T) -> (T, T) {
        if self.swapped {
            (second, first)
        } else {
            (first, second)
        }
    }

    /// Swap direction for a trade that sells the caller's first token.
    pub fn first_is_a(&self) -> bool {
        !self.swapped
    }
}

/// Put `first` / `second` into pool order.
///
/// Rejects malformed addresses, a token paired with itself, and a pair where
/// both sides are native SOL.
pub fn canonicalize(first: &TokenDescriptor, second: &TokenDescriptor) -> Result<CanonicalPair> {
    let mint_first  = first.pubkey()?;
    let mint_second = second.pubkey()?;

    let first_native  = is_native_mint(&mint_first);
    let second_native = is_native_mint(&mint_second);

    if first_native && second_native {
        return Err(Error::validation("both tokens are native SOL; a pool needs one non-native side"));
    }
    if mint_first == mint_second {
        return Err(Error::validation(format!(
            "token {} is paired with itself",
            first.symbol
        )));
    }

    let swapped = second_native;
    let (token_a, token_b, mint_a, mint_b) = if swapped {
        (second.clone(), first.clone(), mint_second, mint_first)
    } else {
        (first.clone(), second.clone(), mint_first, mint_second)
    };

    Ok(CanonicalPair {
        token_a,
        token_b,
        mint_a,
        mint_b,
        swapped,
        is_native: first_native || second_native,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc() -> TokenDescriptor {
        TokenDescriptor::new("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC", 6, "USD Coin")
    }

    fn bonk() -> TokenDescriptor {
        TokenDescriptor::new("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", "BONK", 5, "Bonk")
    }

    #[test]
    fn native_first_keeps_order() {
        let pair = canonicalize(&TokenDescriptor::native(), &usdc()).unwrap();
        assert!(!pair.swapped);
        assert!(pair.is_native);
        assert!(pair.token_a.is_native());
        assert_eq!(pair.arrange(1.0, 100.0), (1.0, 100.0));
    }

    #[test]
    fn native_second_moves_to_a_with_its_amount() {
        let pair = canonicalize(&usdc(), &TokenDescriptor::native()).unwrap();
        assert!(pair.swapped);
        assert!(pair.token_a.is_native());
        assert_eq!(pair.token_b.symbol, "USDC");
        // USDC amount was first; after arranging it must follow USDC into slot B.
        assert_eq!(pair.arrange(100.0, 1.0), (1.0, 100.0));
        assert!(!pair.first_is_a());
    }

    #[test]
    fn non_native_pairs_keep_caller_order() {
        let pair = canonicalize(&bonk(), &usdc()).unwrap();
        assert!(!pair.swapped);
        assert!(!pair.is_native);
        assert_eq!(pair.token_a.symbol, "BONK");

        let reversed = canonicalize(&usdc(), &bonk()).unwrap();
        assert_eq!(reversed.token_a.symbol, "USDC");
    }

    #[test]
    fn rejects_double_native_and_self_pairs() {
        let sol = TokenDescriptor::native();
        assert!(canonicalize(&sol, &sol).unwrap_err().is_validation());
        assert!(canonicalize(&usdc(), &usdc()).unwrap_err().is_validation());
    }

    #[test]
    fn rejects_malformed_address() {
        let bad = TokenDescriptor::new("xyz", "XYZ", 6, "Broken");
        assert!(canonicalize(&bad, &usdc()).unwrap_err().is_validation());
    }
}
