//! Turning a [`TxDraft`] into a signed [`Transaction`].
//!
//! Two paths: local keypairs (sender, optional separate fee payer, plus any
//! extra signers such as a fresh mint), or an external wallet implementing
//! [`WalletAdapter`]. Both check the signer set before signing and that the
//! result carries every required signature.

use std::path::Path;

use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

use crate::assembler::TxDraft;
use crate::error::{Error, Result};

/// An external wallet that signs asynchronously (hardware wallet, browser
/// bridge, remote signer…). It receives a transaction with the blockhash
/// already set and returns it with its signature added.
#[allow(async_fn_in_trait)]
pub trait WalletAdapter {
    /// The wallet's signing key.
    fn address(&self) -> Pubkey;

    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction>;
}

impl WalletAdapter for Keypair {
    fn address(&self) -> Pubkey {
        self.pubkey()
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction> {
        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[self], blockhash)?;
        Ok(tx)
    }
}

/// Sign `draft` with local keypairs.
///
/// `fee_payer` is needed only when the draft was built with a separate fee
/// payer; `extra` covers any other required signer (e.g. a new mint).
pub fn sign_with_keypairs(
    draft:     &TxDraft,
    blockhash: Hash,
    sender:    &Keypair,
    fee_payer: Option<&Keypair>,
    extra:     &[&Keypair],
) -> Result<Transaction> {
    let required = draft.required_signers();

    let mut signers: Vec<&Keypair> = Vec::with_capacity(2 + extra.len());
    for kp in std::iter::once(sender).chain(fee_payer).chain(extra.iter().copied()) {
        let key = kp.pubkey();
        if !required.contains(&key) {
            // Surplus keypairs are harmless but the runtime rejects them.
            log::debug!("skipping keypair {key}: not a required signer");
            continue;
        }
        if !signers.iter().any(|s| s.pubkey() == key) {
            signers.push(kp);
        }
    }

    let missing: Vec<String> = required
        .iter()
        .filter(|k| !signers.iter().any(|s| s.pubkey() == **k))
        .map(|k| k.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::Signing(format!("missing keypair for required signer(s): {}", missing.join(", "))));
    }

    let mut tx = draft.to_transaction();
    tx.try_sign(&signers[..], blockhash)?;
    Ok(tx)
}

/// Sign `draft` through an external wallet.
///
/// `co_signers` are local keypairs that must sign as well (a fresh mint, for
/// instance); they sign first so the wallet sees a partially signed
/// transaction.
pub async fn sign_with_wallet<W: WalletAdapter>(
    draft:      &TxDraft,
    blockhash:  Hash,
    wallet:     &W,
    co_signers: &[&Keypair],
) -> Result<Transaction> {
    let required = draft.required_signers();
    let wallet_key = wallet.address();
    if !required.contains(&wallet_key) {
        return Err(Error::Signing(format!("wallet {wallet_key} is not a signer of this transaction")));
    }

    let mut tx = draft.to_transaction();
    tx.message.recent_blockhash = blockhash;
    let local: Vec<&Keypair> = co_signers
        .iter()
        .copied()
        .filter(|kp| required.contains(&kp.pubkey()))
        .collect();
    if !local.is_empty() {
        tx.try_partial_sign(&local[..], blockhash)?;
    }

    let signed = wallet.sign_transaction(tx).await?;
    if signed.message.recent_blockhash != blockhash {
        return Err(Error::Signing("wallet changed the transaction's blockhash".into()));
    }
    if !signed.is_signed() {
        return Err(Error::Signing("wallet returned a transaction with missing signatures".into()));
    }
    Ok(signed)
}

/// Build a keypair from its 64-byte secret key (Solana CLI layout).
#[allow(deprecated)]
pub fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair> {
    if bytes.len() != 64 {
        return Err(Error::Signing(format!("keypair must be 64 bytes, got {}", bytes.len())));
    }
    Keypair::from_bytes(bytes).map_err(|e| Error::Signing(format!("invalid keypair bytes: {e}")))
}

/// Parse a Solana CLI keypair file body: a JSON array of 64 numbers.
pub fn keypair_from_json(json: &str) -> Result<Keypair> {
    let bytes: Vec<u8> = serde_json::from_str(json)
        .map_err(|e| Error::Signing(format!("keypair JSON is not a byte array: {e}")))?;
    keypair_from_bytes(&bytes)
}

/// Read a Solana CLI keypair file, expanding a leading `~/`.
pub fn load_keypair_file(path: impl AsRef<Path>) -> Result<Keypair> {
    let path = expand_home(path.as_ref());
    let body = std::fs::read_to_string(&path)
        .map_err(|e| Error::Signing(format!("cannot read keypair '{}': {e}", path.display())))?;
    keypair_from_json(&body)
}

fn expand_home(path: &Path) -> std::path::PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix("~/")) {
        Some(rest) => {
            let home = std::env::var("HOME").unwrap_or_default();
            Path::new(&home).join(rest)
        }
        None => path.to_path_buf(),
    }
}
