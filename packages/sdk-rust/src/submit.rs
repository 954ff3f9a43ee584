//! Submission and confirmation polling.

use std::time::Duration;

use solana_sdk::{signature::Signature, transaction::Transaction};
use tokio::time::{sleep, Instant};

use crate::constants::{DEFAULT_CONFIRM_TIMEOUT, DEFAULT_POLL_INTERVAL};
use crate::error::{Error, Result};
use crate::rpc::{ChainRpc, ConfirmLevel, SignatureStatus, Simulation};

/// How long and how hard to wait for a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub timeout:       Duration,
    pub poll_interval: Duration,
    pub level:         ConfirmLevel,
    /// Forwarded to the RPC node's own rebroadcast logic.
    pub max_retries:   Option<usize>,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            timeout:       DEFAULT_CONFIRM_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            level:         ConfirmLevel::default(),
            max_retries:   None,
        }
    }
}

/// Poll `signature` until it reaches `opts.level`, fails, or times out.
///
/// An on-chain failure becomes [`Error::TransactionFailed`]; running out of
/// time becomes [`Error::Timeout`]. RPC errors while polling are returned
/// as they are.
pub async fn wait_for_confirmation<R: ChainRpc>(
    rpc:       &R,
    signature: &Signature,
    opts:      &ConfirmOptions,
) -> Result<()> {
    let started  = Instant::now();
    let deadline = started + opts.timeout;

    loop {
        match rpc.signature_status(signature).await? {
            Some(SignatureStatus::Failed(reason)) => {
                return Err(Error::TransactionFailed { signature: *signature, reason });
            }
            Some(status) if status.reaches(opts.level) => {
                log::debug!("{signature} reached {:?} after {:?}", opts.level, started.elapsed());
                return Ok(());
            }
            status => log::trace!("{signature}: {status:?}"),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(Error::Timeout { signature: *signature, waited: now - started });
        }
        sleep(opts.poll_interval.min(deadline - now)).await;
    }
}

/// Submit a signed transaction and wait for it to confirm.
pub async fn send_and_confirm<R: ChainRpc>(
    rpc:  &R,
    tx:   &Transaction,
    opts: &ConfirmOptions,
) -> Result<Signature> {
    let signature = rpc.submit_transaction(tx, opts.max_retries).await?;
    log::info!("submitted {signature}");
    wait_for_confirmation(rpc, &signature, opts).await?;
    Ok(signature)
}

/// Dry-run a signed transaction. A runtime error is reported in the returned
/// [`Simulation`], not as an `Err`.
pub async fn simulate<R: ChainRpc>(rpc: &R, tx: &Transaction) -> Result<Simulation> {
    let sim = rpc.simulate(tx).await?;
    if let Some(err) = &sim.err {
        log::warn!("simulation failed: {err}");
    }
    Ok(sim)
}
