//! The network collaborator.
//!
//! Builders and the submitter only talk to the chain through [`ChainRpc`], so
//! anything that can answer these six questions can drive them. The
//! nonblocking `solana_client` RPC client is the production implementation.

use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};

use crate::error::Result;

/// Where a submitted signature stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    Processed,
    Confirmed,
    Finalized,
    Failed(String),
}

impl SignatureStatus {
    /// `true` once the status is at least as final as `level`.
    pub fn reaches(&self, level: ConfirmLevel) -> bool {
        match (self, level) {
            (SignatureStatus::Finalized, _) => true,
            (SignatureStatus::Confirmed, ConfirmLevel::Confirmed) => true,
            _ => false,
        }
    }
}

/// Commitment a submission waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmLevel {
    #[default]
    Confirmed,
    Finalized,
}

/// Result of a dry run.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    pub err:            Option<String>,
    pub logs:           Vec<String>,
    pub units_consumed: Option<u64>,
}

/// Everything the SDK needs from the network.
#[allow(async_fn_in_trait)]
pub trait ChainRpc {
    /// Lamports needed for an account of `data_len` bytes to be rent-exempt.
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64>;

    /// The account at `address`, or `None` if it does not exist.
    async fn account(&self, address: &Pubkey) -> Result<Option<Account>>;

    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Submit a signed transaction; `max_retries` is passed to the RPC node.
    async fn submit_transaction(&self, tx: &Transaction, max_retries: Option<usize>) -> Result<Signature>;

    /// Current status of `signature`, `None` if the cluster has not seen it.
    async fn signature_status(&self, signature: &Signature) -> Result<Option<SignatureStatus>>;

    async fn simulate(&self, tx: &Transaction) -> Result<Simulation>;
}

impl ChainRpc for RpcClient {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        Ok(self.get_minimum_balance_for_rent_exemption(data_len).await?)
    }

    async fn account(&self, address: &Pubkey) -> Result<Option<Account>> {
        Ok(self
            .get_account_with_commitment(address, self.commitment())
            .await?
            .value)
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(self.get_latest_blockhash().await?)
    }

    async fn submit_transaction(&self, tx: &Transaction, max_retries: Option<usize>) -> Result<Signature> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(self.commitment().commitment),
            max_retries,
            ..RpcSendTransactionConfig::default()
        };
        Ok(self.send_transaction_with_config(tx, config).await?)
    }

    async fn signature_status(&self, signature: &Signature) -> Result<Option<SignatureStatus>> {
        let statuses = self.get_signature_statuses(&[*signature]).await?.value;
        Ok(statuses.into_iter().next().flatten().map(|status| {
            if let Some(err) = &status.err {
                SignatureStatus::Failed(err.to_string())
            } else if status.satisfies_commitment(CommitmentConfig::finalized()) {
                SignatureStatus::Finalized
            } else if status.satisfies_commitment(CommitmentConfig::confirmed()) {
                SignatureStatus::Confirmed
            } else {
                SignatureStatus::Processed
            }
        }))
    }

    async fn simulate(&self, tx: &Transaction) -> Result<Simulation> {
        let result = self.simulate_transaction(tx).await?.value;
        Ok(Simulation {
            err:            result.err.map(|e| e.to_string()),
            logs:           result.logs.unwrap_or_default(),
            units_consumed: result.units_consumed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalized_reaches_every_level() {
        assert!(SignatureStatus::Finalized.reaches(ConfirmLevel::Confirmed));
        assert!(SignatureStatus::Finalized.reaches(ConfirmLevel::Finalized));
        assert!(SignatureStatus::Confirmed.reaches(ConfirmLevel::Confirmed));
        assert!(!SignatureStatus::Confirmed.reaches(ConfirmLevel::Finalized));
        assert!(!SignatureStatus::Processed.reaches(ConfirmLevel::Confirmed));
        assert!(!SignatureStatus::Failed("x".into()).reaches(ConfirmLevel::Confirmed));
    }
}
