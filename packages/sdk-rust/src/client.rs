//! [`TidepoolClient`], the main entry point. Builds, signs, submits and confirms.

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};

use crate::{
    amm::{build_add_liquidity, build_create_pool, build_remove_liquidity, build_swap, build_swap_in_pool, AmmDraft},
    assembler::{BuildContext, TxDraft},
    batch::{run_batch, BatchOutcome, RetryPolicy},
    canonical::canonicalize,
    constants::{AMM_PROGRAM_ID, DEVNET_RPC, MAINNET_RPC},
    error::{Error, Result},
    instructions::AmmInstruction,
    pda::derive_pool_identity,
    rpc::{ChainRpc, ConfirmLevel, Simulation},
    signing::{sign_with_keypairs, sign_with_wallet, WalletAdapter},
    submit::{self, send_and_confirm, ConfirmOptions},
    token::{build_create_nft, build_create_token, build_native_transfer, build_token_transfer},
    types::{
        AddLiquidityParams, CreateNftParams, CreatePoolParams, CreateTokenParams, PoolIdentity,
        PoolResult, RemoveLiquidityParams, SwapParams, SwapResult, TokenDescriptor, TokenResult,
        TokenTransferParams, TransferParams, TransferResult,
    },
};

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async Tidepool client.
///
/// Every write operation builds a draft, signs it with the sender (and the
/// configured fee payer, if any), submits it and waits for confirmation.
///
/// ```rust,no_run
/// # use tidepool_sdk::{TidepoolClient, SwapParams, TokenDescriptor};
/// # use solana_sdk::signature::Keypair;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TidepoolClient::devnet();
/// let sender = Keypair::new(); // a funded keypair
/// let usdc = TokenDescriptor::new("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC", 6, "USD Coin");
///
/// let out = client.swap(&sender, SwapParams {
///     from_token: TokenDescriptor::native(),
///     to_token:   usdc,
///     amount_in:  0.5,
/// }).await?;
/// println!("swapped on {} in {}", out.pool.address, out.signature);
/// # Ok(())
/// # }
/// ```
pub struct TidepoolClient<R = RpcClient> {
    rpc:        R,
    program_id: Pubkey,
    fee_payer:  Option<Keypair>,
    confirm:    ConfirmOptions,
}

impl TidepoolClient<RpcClient> {
    /// Create a client pointing at any RPC endpoint, at `confirmed` commitment.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self::with_rpc(RpcClient::new_with_commitment(rpc_url.into(), CommitmentConfig::confirmed()))
    }

    /// Pre-configured client for Solana devnet.
    pub fn devnet() -> Self {
        Self::new(DEVNET_RPC)
    }

    /// Pre-configured client for Solana mainnet-beta.
    pub fn mainnet() -> Self {
        Self::new(MAINNET_RPC)
    }

    /// Use `commitment` for RPC reads and as the confirmation target.
    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.rpc = RpcClient::new_with_commitment(self.rpc.url(), commitment);
        self.confirm.level = match commitment.commitment {
            CommitmentLevel::Finalized => ConfirmLevel::Finalized,
            _                          => ConfirmLevel::Confirmed,
        };
        self
    }
}

impl<R: ChainRpc> TidepoolClient<R> {
    /// Wrap any [`ChainRpc`] implementation.
    pub fn with_rpc(rpc: R) -> Self {
        Self {
            rpc,
            program_id: AMM_PROGRAM_ID,
            fee_payer:  None,
            confirm:    ConfirmOptions::default(),
        }
    }

    /// Override the AMM program ID (useful for locally deployed programs).
    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    /// Have `fee_payer` sponsor every transaction this client sends.
    pub fn with_fee_payer(mut self, fee_payer: Keypair) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    pub fn with_confirm_options(mut self, confirm: ConfirmOptions) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn confirm_options(&self) -> &ConfirmOptions {
        &self.confirm
    }

    /// Build context for drafts sent by `sender` through this client.
    pub fn context_for(&self, sender: &Pubkey) -> BuildContext {
        let ctx = BuildContext::new(*sender, self.program_id);
        match &self.fee_payer {
            Some(payer) => ctx.with_fee_payer(payer.pubkey()),
            None        => ctx,
        }
    }

    // ── Pools ─────────────────────────────────────────────────────────────────

    /// Create a pool for a token pair and seed it with both amounts.
    pub async fn create_pool(&self, sender: &Keypair, params: CreatePoolParams) -> Result<PoolResult> {
        let built = build_create_pool(&self.context_for(&sender.pubkey()), &params)?;
        self.send_amm(sender, built).await
    }

    /// Deposit both tokens of a pair into its pool.
    pub async fn add_liquidity(&self, sender: &Keypair, params: AddLiquidityParams) -> Result<PoolResult> {
        let built = build_add_liquidity(&self.context_for(&sender.pubkey()), &params)?;
        self.send_amm(sender, built).await
    }

    /// Burn LP tokens for the underlying pair.
    pub async fn remove_liquidity(&self, sender: &Keypair, params: RemoveLiquidityParams) -> Result<PoolResult> {
        let built = build_remove_liquidity(&self.context_for(&sender.pubkey()), &params)?;
        self.send_amm(sender, built).await
    }

    /// Swap through the pool the pair canonicalizes to. See [`Self::locate_pool`]
    /// when the pool's stored order is unknown.
    pub async fn swap(&self, sender: &Keypair, params: SwapParams) -> Result<SwapResult> {
        let built = build_swap(&self.context_for(&sender.pubkey()), &params)?;
        self.send_swap(sender, built).await
    }

    /// Swap through a pool resolved earlier (e.g. by [`Self::locate_pool`]).
    pub async fn swap_in_pool(
        &self,
        sender:     &Keypair,
        pool:       &PoolIdentity,
        from_token: &TokenDescriptor,
        amount_in:  f64,
    ) -> Result<SwapResult> {
        let built = build_swap_in_pool(&self.context_for(&sender.pubkey()), pool, from_token, amount_in)?;
        self.send_swap(sender, built).await
    }

    /// Find the pool for a pair on-chain, trying both orderings for
    /// non-native pairs.
    ///
    /// The pool must exist and be owned by the configured program.
    pub async fn locate_pool(&self, token_a: &TokenDescriptor, token_b: &TokenDescriptor) -> Result<PoolIdentity> {
        let forward = canonicalize(token_a, token_b)?;
        let mut candidates = vec![forward.clone()];
        if !forward.is_native {
            candidates.push(canonicalize(token_b, token_a)?);
        }

        for pair in &candidates {
            let pool = derive_pool_identity(pair, &self.program_id);
            if let Some(account) = self.rpc.account(&pool.address).await? {
                if account.owner == self.program_id {
                    log::debug!("located pool {} as {}/{}", pool.address, pool.token_a.symbol, pool.token_b.symbol);
                    return Ok(pool);
                }
                log::debug!("{} exists but is owned by {}", pool.address, account.owner);
            }
        }

        Err(Error::PoolNotFound(token_a.symbol.clone(), token_b.symbol.clone()))
    }

    // ── Transfers ─────────────────────────────────────────────────────────────

    /// Send native SOL.
    pub async fn transfer_sol(&self, sender: &Keypair, params: TransferParams) -> Result<TransferResult> {
        let built = build_native_transfer(&self.context_for(&sender.pubkey()), &params)?;
        let sig = self.sign_and_send(&built.draft, sender, &[]).await?;
        Ok(TransferResult { signature: sig.to_string(), recipient: built.recipient, amount: built.amount })
    }

    /// Send SPL tokens, creating the recipient's associated account if needed.
    pub async fn transfer_token(&self, sender: &Keypair, params: TokenTransferParams) -> Result<TransferResult> {
        let built = build_token_transfer(&self.rpc, &self.context_for(&sender.pubkey()), &params).await?;
        let sig = self.sign_and_send(&built.draft, sender, &[]).await?;
        Ok(TransferResult { signature: sig.to_string(), recipient: built.recipient, amount: built.amount })
    }

    // ── Tokens / NFTs ─────────────────────────────────────────────────────────

    /// Create a Token-2022 mint with on-mint metadata and mint the initial supply.
    ///
    /// A fresh mint keypair is generated and co-signs the transaction.
    pub async fn create_token(&self, sender: &Keypair, params: CreateTokenParams) -> Result<TokenResult> {
        let mint = Keypair::new();
        let built = build_create_token(&self.rpc, &self.context_for(&sender.pubkey()), &mint.pubkey(), &params).await?;
        let sig = self.sign_and_send(&built.draft, sender, &[&mint]).await?;
        log::info!("created {} mint {}", params.symbol, built.mint);
        Ok(TokenResult {
            signature:     sig.to_string(),
            mint:          built.mint,
            token_account: built.token_account,
            supply:        built.supply,
        })
    }

    /// Create a one-of-one NFT.
    pub async fn create_nft(&self, sender: &Keypair, params: CreateNftParams) -> Result<TokenResult> {
        let mint = Keypair::new();
        let built = build_create_nft(&self.rpc, &self.context_for(&sender.pubkey()), &mint.pubkey(), &params).await?;
        let sig = self.sign_and_send(&built.draft, sender, &[&mint]).await?;
        log::info!("created NFT {} mint {}", params.name, built.mint);
        Ok(TokenResult {
            signature:     sig.to_string(),
            mint:          built.mint,
            token_account: built.token_account,
            supply:        built.supply,
        })
    }

    /// Create several tokens one after another.
    ///
    /// Stops at the first token that still fails after `retry`; tokens created
    /// before it are reported in the outcome and are not rolled back.
    pub async fn create_tokens(
        &self,
        sender: &Keypair,
        params: &[CreateTokenParams],
        retry:  RetryPolicy,
    ) -> BatchOutcome<TokenResult> {
        run_batch(params, retry, |_, p| {
            let p = p.clone();
            async move { self.create_token(sender, p).await }
        })
        .await
    }

    // ── Lower-level ───────────────────────────────────────────────────────────

    /// Sign `draft` with keypairs and dry-run it.
    pub async fn simulate(&self, draft: &TxDraft, sender: &Keypair, extra: &[&Keypair]) -> Result<Simulation> {
        let blockhash = self.rpc.latest_blockhash().await?;
        let tx = sign_with_keypairs(draft, blockhash, sender, self.fee_payer.as_ref(), extra)?;
        submit::simulate(&self.rpc, &tx).await
    }

    /// Sign `draft` through an external wallet, submit and confirm it.
    ///
    /// The client's fee payer, if any, co-signs alongside `co_signers`.
    pub async fn send_draft_with_wallet<W: WalletAdapter>(
        &self,
        draft:      &TxDraft,
        wallet:     &W,
        co_signers: &[&Keypair],
    ) -> Result<Signature> {
        let local: Vec<&Keypair> = co_signers.iter().copied().chain(self.fee_payer.as_ref()).collect();
        let blockhash = self.rpc.latest_blockhash().await?;
        let tx = sign_with_wallet(draft, blockhash, wallet, &local).await?;
        send_and_confirm(&self.rpc, &tx, &self.confirm).await
    }

    /// Sign `draft` with local keypairs, submit and confirm it.
    pub async fn sign_and_send(&self, draft: &TxDraft, sender: &Keypair, extra: &[&Keypair]) -> Result<Signature> {
        let blockhash = self.rpc.latest_blockhash().await?;
        let tx = sign_with_keypairs(draft, blockhash, sender, self.fee_payer.as_ref(), extra)?;
        send_and_confirm(&self.rpc, &tx, &self.confirm).await
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    async fn send_amm(&self, sender: &Keypair, built: AmmDraft) -> Result<PoolResult> {
        let (amount_a, amount_b) = match built.instruction {
            AmmInstruction::InitPool { amount_a, amount_b }
            | AmmInstruction::AddLiquidity { amount_a, amount_b } => (amount_a, amount_b),
            AmmInstruction::RemoveLiquidity { lp_amount } => (lp_amount, 0),
            AmmInstruction::Swap { .. } => {
                return Err(Error::encoding("swap instruction where a liquidity one was expected"))
            }
        };
        let sig = self.sign_and_send(&built.draft, sender, &[]).await?;
        Ok(PoolResult { signature: sig.to_string(), pool: built.pool, amount_a, amount_b })
    }

    async fn send_swap(&self, sender: &Keypair, built: AmmDraft) -> Result<SwapResult> {
        let AmmInstruction::Swap { amount_in, a_to_b } = built.instruction else {
            return Err(Error::encoding("liquidity instruction where a swap was expected"));
        };
        let sig = self.sign_and_send(&built.draft, sender, &[]).await?;
        Ok(SwapResult { signature: sig.to_string(), pool: built.pool, amount_in, a_to_b })
    }
}
