mod common;

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use tidepool_sdk::{
    batch::RetryPolicy,
    constants::AMM_PROGRAM_ID,
    pda::derive_pool,
    token::build_native_transfer,
    CreateTokenParams, Error, SignatureStatus, SwapParams, TidepoolClient, TokenDescriptor,
    TransferParams,
};

use common::{MockRpc, USDC};

fn token(i: usize) -> CreateTokenParams {
    CreateTokenParams {
        name:           format!("Token {i}"),
        symbol:         format!("T{i}"),
        uri:            format!("https://tidepool.example/{i}.json"),
        decimals:       9,
        initial_supply: 10.0,
        recipient:      None,
    }
}

#[tokio::test]
async fn sol_transfer_is_signed_submitted_and_confirmed() {
    let client = TidepoolClient::with_rpc(MockRpc::default());
    let sender = Keypair::new();
    let recipient = Pubkey::new_unique();

    let out = client
        .transfer_sol(&sender, TransferParams { recipient: recipient.to_string(), amount: 1.5 })
        .await
        .unwrap();

    assert_eq!(out.amount, 1_500_000_000);
    let sent = client.rpc().submitted();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_signed());
    assert_eq!(sent[0].signatures[0].to_string(), out.signature);
}

#[tokio::test]
async fn fee_payer_signs_first() {
    let sponsor = Keypair::new();
    let sponsor_key = sponsor.pubkey();
    let client = TidepoolClient::with_rpc(MockRpc::default()).with_fee_payer(sponsor);
    let sender = Keypair::new();

    client
        .transfer_sol(&sender, TransferParams { recipient: Pubkey::new_unique().to_string(), amount: 0.1 })
        .await
        .unwrap();

    let tx = &client.rpc().submitted()[0];
    assert_eq!(tx.message.account_keys[0], sponsor_key);
    assert_eq!(tx.signatures.len(), 2);
    assert!(tx.is_signed());
}

#[tokio::test]
async fn wallet_signs_a_draft_built_for_it() {
    let client = TidepoolClient::with_rpc(MockRpc::default());
    let wallet = Keypair::new();
    let built = build_native_transfer(&client.context_for(&wallet.pubkey()), &TransferParams {
        recipient: Pubkey::new_unique().to_string(),
        amount:    0.25,
    })
    .unwrap();

    let sig = client.send_draft_with_wallet(&built.draft, &wallet, &[]).await.unwrap();

    let tx = &client.rpc().submitted()[0];
    assert!(tx.is_signed());
    assert_eq!(tx.signatures, vec![sig]);
}

#[tokio::test]
async fn wallet_send_is_co_signed_by_the_sponsor() {
    let sponsor = Keypair::new();
    let sponsor_key = sponsor.pubkey();
    let client = TidepoolClient::with_rpc(MockRpc::default()).with_fee_payer(sponsor);
    let wallet = Keypair::new();
    let built = build_native_transfer(&client.context_for(&wallet.pubkey()), &TransferParams {
        recipient: Pubkey::new_unique().to_string(),
        amount:    0.25,
    })
    .unwrap();

    client.send_draft_with_wallet(&built.draft, &wallet, &[]).await.unwrap();

    let tx = &client.rpc().submitted()[0];
    assert_eq!(tx.message.account_keys[0], sponsor_key);
    assert_eq!(tx.signatures.len(), 2);
    assert!(tx.is_signed());
}

#[tokio::test]
async fn on_chain_failure_surfaces_as_transaction_failed() {
    let rpc = MockRpc { status: Some(SignatureStatus::Failed("InstructionError(0, Custom(1))".into())), ..MockRpc::default() };
    let client = TidepoolClient::with_rpc(rpc);
    let err = client
        .swap(&Keypair::new(), SwapParams {
            from_token: TokenDescriptor::native(),
            to_token:   TokenDescriptor::new(USDC, "USDC", 6, "USD Coin"),
            amount_in:  1.0,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransactionFailed { .. }));
}

#[tokio::test]
async fn validation_happens_before_any_network_call() {
    let client = TidepoolClient::with_rpc(MockRpc::default());
    let err = client
        .transfer_sol(&Keypair::new(), TransferParams { recipient: Pubkey::new_unique().to_string(), amount: -1.0 })
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(client.rpc().submitted().is_empty());
}

#[tokio::test]
async fn batch_keeps_what_succeeded_before_the_failure() {
    let rpc = MockRpc { fail_submit_at: Some(2), ..MockRpc::default() };
    let client = TidepoolClient::with_rpc(rpc);
    let sender = Keypair::new();
    let tokens: Vec<_> = (0..4).map(token).collect();

    let outcome = client.create_tokens(&sender, &tokens, RetryPolicy::NONE).await;

    assert_eq!(outcome.completed.len(), 2);
    let failure = outcome.failure.expect("third token fails");
    assert_eq!(failure.index, 2);
    assert!(matches!(failure.error, Error::Network(_)));
    // Nothing after the failing item was attempted.
    assert_eq!(client.rpc().submitted().len(), 2);
    assert_ne!(outcome.completed[0].mint, outcome.completed[1].mint);
}

#[tokio::test]
async fn locate_pool_finds_the_stored_order() {
    let usdc = TokenDescriptor::new(USDC, "USDC", 6, "USD Coin");
    let tide_mint = Pubkey::new_unique();
    let tide = TokenDescriptor::new(tide_mint.to_string(), "TIDE", 9, "Tide");

    // Pool was created as TIDE/USDC.
    let usdc_mint: Pubkey = USDC.parse().unwrap();
    let (stored, _) = derive_pool(&tide_mint, &usdc_mint, &AMM_PROGRAM_ID);
    let client = TidepoolClient::with_rpc(MockRpc::default().with_account(stored, AMM_PROGRAM_ID));

    let pool = client.locate_pool(&usdc, &tide).await.unwrap();
    assert_eq!(pool.address, stored);
    assert_eq!(pool.mint_a, tide_mint);

    let err = client
        .locate_pool(&usdc, &TokenDescriptor::new(Pubkey::new_unique().to_string(), "X", 6, "X"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PoolNotFound(..)));
}

#[tokio::test]
async fn locate_pool_ignores_accounts_of_other_programs() {
    let usdc = TokenDescriptor::new(USDC, "USDC", 6, "USD Coin");
    let usdc_mint: Pubkey = USDC.parse().unwrap();
    let (native_pool, _) = derive_pool(&tidepool_sdk::constants::NATIVE_MINT, &usdc_mint, &AMM_PROGRAM_ID);
    let client = TidepoolClient::with_rpc(MockRpc::default().with_account(native_pool, Pubkey::new_unique()));

    assert!(client.locate_pool(&TokenDescriptor::native(), &usdc).await.is_err());
}
