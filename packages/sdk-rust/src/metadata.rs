//! Token-2022 embedded metadata: the `initialize` instruction of the token
//! metadata interface, encoded by hand, and the TLV size it occupies on the
//! mint.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::error::{Error, Result};

/// Bytes taken by a TLV entry header in a Token-2022 account (u16 type + u16 length).
const TLV_HEADER_LEN: usize = 4;

/// Interface namespace for the metadata `initialize` discriminator.
const INITIALIZE_PREIMAGE: &str = "spl_token_metadata_interface:initialize_account";

/// First 8 bytes of sha256 over an interface instruction name.
fn disc(preimage: &str) -> [u8; 8] {
    let h = solana_sdk::hash::hash(preimage.as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&h.to_bytes()[..8]);
    out
}

/// Borsh string: u32 LE length prefix, then the UTF-8 bytes.
fn put_str(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    let len = u32::try_from(s.len())
        .map_err(|_| Error::encoding(format!("metadata field of {} bytes is too long", s.len())))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Name, symbol and URI stored on the mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFields<'a> {
    pub name:   &'a str,
    pub symbol: &'a str,
    pub uri:    &'a str,
}

impl MetadataFields<'_> {
    /// Size of the metadata TLV entry once written: header, update authority,
    /// mint, three strings and an empty additional-metadata vector.
    pub fn tlv_len(&self) -> usize {
        TLV_HEADER_LEN
            + 32
            + 32
            + 4 + self.name.len()
            + 4 + self.symbol.len()
            + 4 + self.uri.len()
            + 4
    }
}

/// Build the metadata `initialize` instruction for a mint that points at
/// itself. `mint_authority` must sign.
pub fn initialize_metadata_ix(
    token_program:    &Pubkey,
    mint:             &Pubkey,
    update_authority: &Pubkey,
    mint_authority:   &Pubkey,
    fields:           &MetadataFields<'_>,
) -> Result<Instruction> {
    let mut data = Vec::with_capacity(8 + fields.tlv_len());
    data.extend_from_slice(&disc(INITIALIZE_PREIMAGE));
    put_str(&mut data, fields.name)?;
    put_str(&mut data, fields.symbol)?;
    put_str(&mut data, fields.uri)?;

    Ok(Instruction {
        program_id: *token_program,
        accounts: vec![
            AccountMeta::new(*mint, false),                     // metadata lives in the mint
            AccountMeta::new_readonly(*update_authority, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(*mint_authority, true),
        ],
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TOKEN_2022_PROGRAM_ID;

    fn fields() -> MetadataFields<'static> {
        MetadataFields { name: "Tide", symbol: "TIDE", uri: "https://x.io/t.json" }
    }

    #[test]
    fn discriminator_matches_interface_hash() {
        let ix = initialize_metadata_ix(
            &TOKEN_2022_PROGRAM_ID,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &fields(),
        )
        .unwrap();
        let expected = solana_sdk::hash::hash(INITIALIZE_PREIMAGE.as_bytes()).to_bytes();
        assert_eq!(ix.data[..8], expected[..8]);
    }

    #[test]
    fn strings_are_length_prefixed() {
        let ix = initialize_metadata_ix(
            &TOKEN_2022_PROGRAM_ID,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &fields(),
        )
        .unwrap();
        let body = &ix.data[8..];
        assert_eq!(&body[..4], &4u32.to_le_bytes());
        assert_eq!(&body[4..8], b"Tide");
        assert_eq!(&body[8..12], &4u32.to_le_bytes());
        assert_eq!(&body[12..16], b"TIDE");
        assert_eq!(&body[16..20], &19u32.to_le_bytes());
        assert_eq!(&body[20..], b"https://x.io/t.json");
    }

    #[test]
    fn account_roles() {
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let ix = initialize_metadata_ix(&TOKEN_2022_PROGRAM_ID, &mint, &authority, &authority, &fields())
            .unwrap();
        assert_eq!(ix.accounts.len(), 4);
        assert!(ix.accounts[0].is_writable && ix.accounts[0].pubkey == mint);
        assert!(!ix.accounts[1].is_signer);
        assert!(ix.accounts[3].is_signer && !ix.accounts[3].is_writable);
    }

    #[test]
    fn tlv_len_counts_every_field() {
        // 4 + 64 + (4+4) + (4+4) + (4+19) + 4
        assert_eq!(fields().tlv_len(), 115);
    }
}
