//! In-memory `ChainRpc` for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};
use tidepool_sdk::{ChainRpc, Error, Result, SignatureStatus, Simulation};

pub const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

pub struct MockRpc {
    /// Lamports per byte of account data (0 = a flat rent regardless of size).
    pub rent_per_byte:  u64,
    pub accounts:       Mutex<HashMap<Pubkey, Account>>,
    pub submitted:      Mutex<Vec<Transaction>>,
    /// Submission with this index (0-based) fails with a network error.
    pub fail_submit_at: Option<usize>,
    pub status:         Option<SignatureStatus>,
}

impl Default for MockRpc {
    fn default() -> Self {
        Self {
            rent_per_byte:  0,
            accounts:       Mutex::new(HashMap::new()),
            submitted:      Mutex::new(Vec::new()),
            fail_submit_at: None,
            status:         Some(SignatureStatus::Confirmed),
        }
    }
}

impl MockRpc {
    pub fn with_account(self, address: Pubkey, owner: Pubkey) -> Self {
        self.accounts.lock().unwrap().insert(address, Account {
            lamports:   1_000_000,
            data:       vec![],
            owner,
            executable: false,
            rent_epoch: 0,
        });
        self
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.lock().unwrap().clone()
    }
}

impl ChainRpc for MockRpc {
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        Ok(890_880 + self.rent_per_byte * data_len as u64)
    }

    async fn account(&self, address: &Pubkey) -> Result<Option<Account>> {
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_from_array([7u8; 32]))
    }

    async fn submit_transaction(&self, tx: &Transaction, _max_retries: Option<usize>) -> Result<Signature> {
        let mut submitted = self.submitted.lock().unwrap();
        if self.fail_submit_at == Some(submitted.len()) {
            return Err(Error::Network("connection reset".into()));
        }
        submitted.push(tx.clone());
        Ok(tx.signatures[0])
    }

    async fn signature_status(&self, _signature: &Signature) -> Result<Option<SignatureStatus>> {
        Ok(self.status.clone())
    }

    async fn simulate(&self, _tx: &Transaction) -> Result<Simulation> {
        Ok(Simulation { units_consumed: Some(1_400), ..Simulation::default() })
    }
}
