//! Transfers and Token-2022 mint creation.
//!
//! Unlike the AMM builders these are allowed a few read-only RPC calls: rent
//! lookups for the new mint and existence checks on associated accounts, so
//! the draft never tries to create an account that is already there.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use spl_associated_token_account::instruction::create_associated_token_account;
use spl_token_2022::{
    extension::{metadata_pointer, ExtensionType},
    instruction::{initialize_mint, mint_to, transfer_checked},
    state::Mint,
};

use crate::amount::{ensure_positive, to_base_units};
use crate::assembler::{BuildContext, TxDraft};
use crate::constants::{NATIVE_DECIMALS, SYSTEM_PROGRAM_ID, TOKEN_2022_PROGRAM_ID};
use crate::error::{Error, Result};
use crate::metadata::{initialize_metadata_ix, MetadataFields};
use crate::pda::derive_ata;
use crate::rpc::ChainRpc;
use crate::types::{parse_address, CreateNftParams, CreateTokenParams, TokenTransferParams, TransferParams};

// ─── System program ───────────────────────────────────────────────────────────

const SYSTEM_CREATE_ACCOUNT: u32 = 0;
const SYSTEM_TRANSFER:       u32 = 2;

/// System `Transfer`: u32 LE index + u64 LE lamports.
pub fn system_transfer_ix(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data,
    }
}

/// System `CreateAccount`: u32 LE index + lamports + space + owner.
pub fn system_create_account_ix(
    payer:    &Pubkey,
    account:  &Pubkey,
    lamports: u64,
    space:    u64,
    owner:    &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(52);
    data.extend_from_slice(&SYSTEM_CREATE_ACCOUNT.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner.as_ref());
    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![AccountMeta::new(*payer, true), AccountMeta::new(*account, true)],
        data,
    }
}

// ─── Transfers ────────────────────────────────────────────────────────────────

/// A transfer draft and the amount it moves, in base units.
#[derive(Debug, Clone)]
pub struct TransferDraft {
    pub draft:     TxDraft,
    pub recipient: Pubkey,
    pub amount:    u64,
}

/// Move SOL from the sender to `params.recipient`. No network I/O.
pub fn build_native_transfer(ctx: &BuildContext, params: &TransferParams) -> Result<TransferDraft> {
    ensure_positive(params.amount, "amount")?;
    let recipient = parse_address(&params.recipient, "recipient")?;
    let lamports = to_base_units(params.amount, NATIVE_DECIMALS)?;

    let mut draft = TxDraft::for_context(ctx);
    draft.push(system_transfer_ix(&ctx.sender, &recipient, lamports));
    Ok(TransferDraft { draft, recipient, amount: lamports })
}

/// Move SPL tokens between associated accounts, creating the recipient's
/// account first when it does not exist yet.
pub async fn build_token_transfer<R: ChainRpc>(
    rpc:    &R,
    ctx:    &BuildContext,
    params: &TokenTransferParams,
) -> Result<TransferDraft> {
    ensure_positive(params.amount, "amount")?;
    if params.token.is_native() {
        return Err(Error::validation("native SOL is sent with a native transfer, not a token transfer"));
    }
    let mint = params.token.pubkey()?;
    let recipient = parse_address(&params.recipient, "recipient")?;
    let amount = to_base_units(params.amount, params.token.decimals)?;

    let program = params.token_program.id();
    let source = derive_ata(&ctx.sender, &mint, &program);
    let destination = derive_ata(&recipient, &mint, &program);

    let mut draft = TxDraft::for_context(ctx);
    if rpc.account(&destination).await?.is_none() {
        log::debug!("recipient account {destination} missing; creating it");
        draft.push(create_associated_token_account(&ctx.payer(), &recipient, &mint, &program));
    }
    let ix = transfer_checked(
        &program,
        &source,
        &mint,
        &destination,
        &ctx.sender,
        &[],
        amount,
        params.token.decimals,
    )
    .map_err(|e| Error::encoding(e.to_string()))?;
    draft.push(ix);

    Ok(TransferDraft { draft, recipient, amount })
}

// ─── Mint creation ────────────────────────────────────────────────────────────

/// A token-creation draft. The mint keypair must co-sign.
#[derive(Debug, Clone)]
pub struct TokenDraft {
    pub draft:         TxDraft,
    pub mint:          Pubkey,
    /// Recipient's associated account holding the initial supply.
    pub token_account: Pubkey,
    /// Initial supply in base units.
    pub supply:        u64,
}

fn require_text(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{what} must not be empty")));
    }
    Ok(())
}

/// Create a Token-2022 mint at `mint` whose metadata lives in the mint
/// itself, then mint the initial supply to the recipient.
///
/// Instruction order: create account, metadata pointer, initialize mint,
/// rent top-up (if any), metadata, recipient account (if missing), mint-to.
pub async fn build_create_token<R: ChainRpc>(
    rpc:    &R,
    ctx:    &BuildContext,
    mint:   &Pubkey,
    params: &CreateTokenParams,
) -> Result<TokenDraft> {
    require_text(&params.name, "name")?;
    require_text(&params.symbol, "symbol")?;
    ensure_positive(params.initial_supply, "initial_supply")?;
    let supply = to_base_units(params.initial_supply, params.decimals)?;
    let recipient = match &params.recipient {
        Some(r) => parse_address(r, "recipient")?,
        None    => ctx.sender,
    };

    let fields = MetadataFields { name: &params.name, symbol: &params.symbol, uri: &params.uri };
    let mint_len = ExtensionType::try_calculate_account_len::<Mint>(&[ExtensionType::MetadataPointer])
        .map_err(|e| Error::encoding(e.to_string()))?;
    let full_len = mint_len + fields.tlv_len();

    let mint_rent = rpc.minimum_balance_for_rent_exemption(mint_len).await?;
    let full_rent = rpc.minimum_balance_for_rent_exemption(full_len).await?;
    let top_up = full_rent.saturating_sub(mint_rent);

    let payer = ctx.payer();
    let authority = ctx.sender;
    let program = TOKEN_2022_PROGRAM_ID;
    let token_account = derive_ata(&recipient, mint, &program);

    let mut draft = TxDraft::for_context(ctx);
    draft.push(system_create_account_ix(&payer, mint, mint_rent, mint_len as u64, &program));
    draft.push(
        metadata_pointer::instruction::initialize(&program, mint, Some(authority), Some(*mint))
            .map_err(|e| Error::encoding(e.to_string()))?,
    );
    draft.push(
        initialize_mint(&program, mint, &authority, None, params.decimals)
            .map_err(|e| Error::encoding(e.to_string()))?,
    );
    if top_up > 0 {
        draft.push(system_transfer_ix(&payer, mint, top_up));
    }
    draft.push(initialize_metadata_ix(&program, mint, &authority, &authority, &fields)?);
    if rpc.account(&token_account).await?.is_none() {
        draft.push(create_associated_token_account(&payer, &recipient, mint, &program));
    }
    draft.push(
        mint_to(&program, mint, &token_account, &authority, &[], supply)
            .map_err(|e| Error::encoding(e.to_string()))?,
    );

    log::debug!(
        "token {} mint {mint}: {} instructions, top-up {top_up} lamports",
        params.symbol,
        draft.instructions().len()
    );
    Ok(TokenDraft { draft, mint: *mint, token_account, supply })
}

/// A one-of-one NFT: a Token-2022 mint with 0 decimals and supply 1.
pub async fn build_create_nft<R: ChainRpc>(
    rpc:    &R,
    ctx:    &BuildContext,
    mint:   &Pubkey,
    params: &CreateNftParams,
) -> Result<TokenDraft> {
    require_text(&params.uri, "uri")?;
    build_create_token(rpc, ctx, mint, &CreateTokenParams::from(params.clone())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AMM_PROGRAM_ID;

    fn ctx() -> BuildContext {
        BuildContext::new(Pubkey::new_unique(), AMM_PROGRAM_ID)
    }

    #[test]
    fn native_transfer_is_one_system_instruction() {
        let ctx = ctx();
        let to = Pubkey::new_unique();
        let out = build_native_transfer(&ctx, &TransferParams { recipient: to.to_string(), amount: 0.25 }).unwrap();

        assert_eq!(out.amount, 250_000_000);
        let ixs = out.draft.instructions();
        assert_eq!(ixs.len(), 1);
        assert_eq!(ixs[0].program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(&ixs[0].data[..4], &2u32.to_le_bytes());
        assert_eq!(&ixs[0].data[4..], &250_000_000u64.to_le_bytes());
        assert_eq!(ixs[0].accounts[0].pubkey, ctx.sender);
        assert_eq!(ixs[0].accounts[1].pubkey, to);
    }

    #[test]
    fn native_transfer_validates_input() {
        let ctx = ctx();
        let err = build_native_transfer(&ctx, &TransferParams { recipient: "nope".into(), amount: 1.0 }).unwrap_err();
        assert!(err.is_validation());
        let err = build_native_transfer(&ctx, &TransferParams {
            recipient: Pubkey::new_unique().to_string(),
            amount:    0.0,
        })
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn create_account_layout() {
        let payer = Pubkey::new_unique();
        let account = Pubkey::new_unique();
        let ix = system_create_account_ix(&payer, &account, 1_000, 234, &TOKEN_2022_PROGRAM_ID);
        assert_eq!(ix.data.len(), 52);
        assert_eq!(&ix.data[..4], &0u32.to_le_bytes());
        assert_eq!(&ix.data[4..12], &1_000u64.to_le_bytes());
        assert_eq!(&ix.data[12..20], &234u64.to_le_bytes());
        assert_eq!(&ix.data[20..], TOKEN_2022_PROGRAM_ID.as_ref());
        assert!(ix.accounts.iter().all(|m| m.is_signer && m.is_writable));
    }
}
