//! SDK error type.

use std::time::Duration;

use solana_sdk::signature::Signature;

/// All errors returned by the Tidepool SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Validation ───────────────────────────────────────────────────────────
    /// Caller input was rejected before any derivation, encoding or network work.
    #[error("Invalid argument: {0}")]
    Validation(String),

    // ── Encoding ─────────────────────────────────────────────────────────────
    /// An instruction could not be laid out the way the program expects.
    #[error("Encoding error: {0}")]
    Encoding(String),

    // ── RPC / network ────────────────────────────────────────────────────────
    /// A Solana JSON-RPC call failed.
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    /// A network collaborator failed without a `ClientError` to wrap.
    #[error("Network error: {0}")]
    Network(String),

    /// The transaction landed but the runtime reported an error.
    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: Signature, reason: String },

    /// Neither ordering of the pair has a pool account owned by the program.
    #[error("No pool found for {0}/{1}")]
    PoolNotFound(String, String),

    /// Confirmation polling gave up.
    #[error("Transaction {signature} not confirmed after {waited:?}")]
    Timeout { signature: Signature, waited: Duration },

    // ── Signing ──────────────────────────────────────────────────────────────
    #[error("Signing error: {0}")]
    Signing(String),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub(crate) fn encoding(msg: impl Into<String>) -> Self {
        Error::Encoding(msg.into())
    }

    /// `true` for errors raised by input checks, before anything was built.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

impl From<solana_sdk::signer::SignerError> for Error {
    fn from(e: solana_sdk::signer::SignerError) -> Self {
        Error::Signing(e.to_string())
    }
}
