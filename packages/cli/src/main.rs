use anyhow::{anyhow, bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use solana_sdk::{pubkey::Pubkey, signature::Signer};
use std::str::FromStr;
use tidepool_sdk::{
    batch::RetryPolicy,
    canonical::canonicalize,
    constants::{AMM_PROGRAM_ID, DEVNET_RPC, NATIVE_DECIMALS, TOKEN_2022_PROGRAM_ID},
    pda::derive_pool_identity,
    signing::load_keypair_file,
    AddLiquidityParams, CreateNftParams, CreatePoolParams, CreateTokenParams, PoolIdentity,
    RemoveLiquidityParams, SwapParams, TidepoolClient, TokenDescriptor, TokenProgram,
    TokenTransferParams, TransferParams,
};

// ─── Token symbol registry (mainnet-beta) ────────────────────────────────────

const KNOWN_TOKENS: &[(&str, &str, u8, &str)] = &[
    ("SOL",  "So11111111111111111111111111111111111111112",  9, "Solana"),
    ("USDC", "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", 6, "USD Coin"),
    ("USDT", "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", 6, "Tether USD"),
];

/// Offset of `decimals` in an SPL / Token-2022 mint account.
const MINT_DECIMALS_OFFSET: usize = 44;

type Client = TidepoolClient;

/// Resolve a built-in symbol or `<mint>[:<decimals>]`.
///
/// A bare mint address has its decimals read from the mint account.
async fn resolve_token(client: &Client, text: &str) -> Result<TokenDescriptor> {
    let upper = text.to_uppercase();
    for (sym, addr, decimals, name) in KNOWN_TOKENS {
        if upper == *sym {
            return Ok(TokenDescriptor::new(*addr, *sym, *decimals, *name));
        }
    }

    let (addr, decimals) = match text.split_once(':') {
        Some((addr, d)) => (addr, Some(d.parse::<u8>().with_context(|| format!("bad decimals in '{text}'"))?)),
        None            => (text, None),
    };
    let mint = Pubkey::from_str(addr).map_err(|_| anyhow!(
        "Unknown token '{}'. Use a built-in symbol ({}) or <mint>[:<decimals>].",
        text,
        KNOWN_TOKENS.iter().map(|(s, ..)| *s).collect::<Vec<_>>().join(", ")
    ))?;

    let decimals = match decimals {
        Some(d) => d,
        None => {
            let account = client
                .rpc()
                .get_account(&mint)
                .await
                .with_context(|| format!("cannot fetch mint {mint} to read its decimals"))?;
            *account
                .data
                .get(MINT_DECIMALS_OFFSET)
                .ok_or_else(|| anyhow!("{mint} is not a mint account ({} bytes)", account.data.len()))?
        }
    };
    Ok(TokenDescriptor::new(addr, short(&mint), decimals, addr))
}

/// Resolve `A-B`.
async fn resolve_pair(client: &Client, pair: &str) -> Result<(TokenDescriptor, TokenDescriptor)> {
    let (a, b) = split_pair(pair)?;
    let token_a = resolve_token(client, a).await.context("pair: token A")?;
    let token_b = resolve_token(client, b).await.context("pair: token B")?;
    Ok((token_a, token_b))
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('-') {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok((a, b)),
        _ => bail!("--pair must be TOKEN_A-TOKEN_B (e.g. SOL-USDC or <mintA>-<mintB>). Got: '{pair}'"),
    }
}

/// Shortened address for display.
fn short(key: &Pubkey) -> String {
    let addr = key.to_string();
    format!("{}…{}", &addr[..4], &addr[addr.len() - 4..])
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// Tidepool: constant-product AMM, token and NFT minting on Solana.
///
/// Every command supports --json for machine-readable output.
/// Amounts are human amounts (1.5 SOL, 100 USDC); the SDK converts them to
/// base units with each token's decimals.
#[derive(Parser)]
#[command(
    name    = "tidepool",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Tidepool AMM client: pools, swaps, transfers, tokens and NFTs on Solana.",
    after_help = "\
ENVIRONMENT:
  TIDEPOOL_RPC_URL    Solana JSON-RPC endpoint  [default: https://api.devnet.solana.com]
  TIDEPOOL_KEYPAIR    Path to the sender's keypair JSON  [default: ~/.config/solana/id.json]
  RUST_LOG            Log filter (overrides --verbose)

QUICK START:
  tidepool derive-pool   --pair SOL-USDC
  tidepool create-pool   --pair SOL-USDC --amount-a 1 --amount-b 150
  tidepool swap          --in SOL --out USDC --amount 0.5
  tidepool create-token  --name Tide --symbol TIDE --uri https://… --supply 1000000"
)]
struct Cli {
    /// Solana JSON-RPC endpoint
    #[arg(long, global = true, value_name = "URL", default_value = DEVNET_RPC, env = "TIDEPOOL_RPC_URL")]
    rpc_url: String,

    /// Path to the sender's keypair JSON file
    #[arg(
        long,
        global        = true,
        value_name    = "PATH",
        default_value = "~/.config/solana/id.json",
        env           = "TIDEPOOL_KEYPAIR"
    )]
    keypair: String,

    /// Keypair that pays fees and rent instead of the sender
    #[arg(long, global = true, value_name = "PATH")]
    fee_payer: Option<String>,

    /// Tidepool AMM program to target
    #[arg(long, global = true, value_name = "PUBKEY")]
    program_id: Option<Pubkey>,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every derived address of a pool; nothing is sent
    ///
    /// SOL is always token A. Other pairs keep the given order, so A-B and
    /// B-A are different pools.
    DerivePool {
        /// Token pair, e.g. SOL-USDC or <mintA>:<decimals>-<mintB>:<decimals>
        #[arg(long, value_name = "A-B")]
        pair: String,
    },

    /// Create a pool and deposit the first liquidity
    CreatePool {
        #[arg(long, value_name = "A-B")]
        pair: String,
        /// Amount of the first token in --pair
        #[arg(long, value_name = "AMOUNT")]
        amount_a: f64,
        /// Amount of the second token in --pair
        #[arg(long, value_name = "AMOUNT")]
        amount_b: f64,
    },

    /// Deposit both tokens into an existing pool
    AddLiquidity {
        #[arg(long, value_name = "A-B")]
        pair: String,
        #[arg(long, value_name = "AMOUNT")]
        amount_a: f64,
        #[arg(long, value_name = "AMOUNT")]
        amount_b: f64,
    },

    /// Burn LP tokens for a share of both vaults
    RemoveLiquidity {
        #[arg(long, value_name = "A-B")]
        pair: String,
        /// LP tokens to burn
        #[arg(long, value_name = "AMOUNT")]
        lp_amount: f64,
        /// Decimals of the pool's LP mint
        #[arg(long, value_name = "N", default_value_t = NATIVE_DECIMALS)]
        lp_decimals: u8,
    },

    /// Swap one token for another
    #[command(
        after_help = "\
NOTES:
  For pairs without SOL the pool is assumed to be stored as IN/OUT.
  Pass --locate to look the pool up on-chain in both orders first."
    )]
    Swap {
        #[arg(long = "in", value_name = "TOKEN")]
        token_in: String,
        #[arg(long = "out", value_name = "TOKEN")]
        token_out: String,
        #[arg(long, value_name = "AMOUNT")]
        amount: f64,
        /// Resolve the pool's stored token order on-chain
        #[arg(long, default_value_t = false)]
        locate: bool,
    },

    /// Send SOL, or an SPL token with --token
    Transfer {
        /// Recipient wallet address
        #[arg(long, value_name = "PUBKEY")]
        to: String,
        #[arg(long, value_name = "AMOUNT")]
        amount: f64,
        /// Token to send instead of SOL
        #[arg(long, value_name = "TOKEN")]
        token: Option<String>,
        /// The token is owned by the Token-2022 program
        #[arg(long, default_value_t = false)]
        token_2022: bool,
    },

    /// Create a Token-2022 token with on-mint metadata
    CreateToken {
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        /// Off-chain metadata JSON
        #[arg(long, default_value = "")]
        uri: String,
        #[arg(long, default_value_t = 9)]
        decimals: u8,
        /// Initial supply minted to the recipient
        #[arg(long, value_name = "AMOUNT")]
        supply: f64,
        /// Holder of the initial supply [default: sender]
        #[arg(long, value_name = "PUBKEY")]
        recipient: Option<String>,
        /// Create this many tokens named "<name> #i" / "<symbol>i"
        #[arg(long, value_name = "N", default_value_t = 1)]
        count: usize,
        /// Tries per token in a batch
        #[arg(long, value_name = "N", default_value_t = 1)]
        attempts: u32,
    },

    /// Create a one-of-one NFT (decimals 0, supply 1)
    CreateNft {
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        uri: String,
        #[arg(long, value_name = "PUBKEY")]
        recipient: Option<String>,
    },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().len() == 1 {
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut client = TidepoolClient::new(cli.rpc_url.clone())
        .with_program_id(cli.program_id.unwrap_or(AMM_PROGRAM_ID));
    if let Some(path) = &cli.fee_payer {
        let payer = load_keypair_file(path).with_context(|| format!("--fee-payer '{path}'"))?;
        client = client.with_fee_payer(payer);
    }

    match &cli.command {
        Commands::DerivePool { pair } => cmd_derive_pool(&client, pair, cli.json).await,
        Commands::CreatePool { pair, amount_a, amount_b } => {
            cmd_deposit(&client, &cli, pair, *amount_a, *amount_b, true).await
        }
        Commands::AddLiquidity { pair, amount_a, amount_b } => {
            cmd_deposit(&client, &cli, pair, *amount_a, *amount_b, false).await
        }
        Commands::RemoveLiquidity { pair, lp_amount, lp_decimals } => {
            cmd_remove_liquidity(&client, &cli, pair, *lp_amount, *lp_decimals).await
        }
        Commands::Swap { token_in, token_out, amount, locate } => {
            cmd_swap(&client, &cli, token_in, token_out, *amount, *locate).await
        }
        Commands::Transfer { to, amount, token, token_2022 } => {
            cmd_transfer(&client, &cli, to, *amount, token.as_deref(), *token_2022).await
        }
        Commands::CreateToken { name, symbol, uri, decimals, supply, recipient, count, attempts } => {
            let params = CreateTokenParams {
                name:           name.clone(),
                symbol:         symbol.clone(),
                uri:            uri.clone(),
                decimals:       *decimals,
                initial_supply: *supply,
                recipient:      recipient.clone(),
            };
            cmd_create_token(&client, &cli, params, *count, *attempts).await
        }
        Commands::CreateNft { name, symbol, uri, recipient } => {
            let params = CreateNftParams {
                name:      name.clone(),
                symbol:    symbol.clone(),
                uri:       uri.clone(),
                recipient: recipient.clone(),
            };
            cmd_create_nft(&client, &cli, params).await
        }
    }
}

fn sender(cli: &Cli) -> Result<solana_sdk::signature::Keypair> {
    load_keypair_file(&cli.keypair).map_err(|e| anyhow!(
        "{e}\n  Set TIDEPOOL_KEYPAIR or pass --keypair to specify a different path."
    ))
}

fn to_json(value: &impl Serialize) -> Result<serde_json::Value> {
    serde_json::to_value(value).context("cannot render JSON output")
}

fn print_pool(pool: &PoolIdentity) {
    println!("  Pool             {}  (bump {})", pool.address, pool.bump);
    println!("  Token A          {}  ({})", pool.token_a.symbol, pool.mint_a);
    println!("  Token B          {}  ({})", pool.token_b.symbol, pool.mint_b);
    println!("  Vault A          {}", pool.vault_a);
    println!("  Vault B          {}", pool.vault_b);
    println!("  LP mint          {}", pool.lp_mint);
    println!("  Native pool      {}", pool.is_native);
}

// ─── derive-pool ─────────────────────────────────────────────────────────────

async fn cmd_derive_pool(client: &Client, pair: &str, json_output: bool) -> Result<()> {
    let (a, b) = resolve_pair(client, pair).await?;
    let canonical = canonicalize(&a, &b)?;
    let pool = derive_pool_identity(&canonical, client.program_id());

    if json_output {
        let mut out = to_json(&pool)?;
        out["command"] = json!("derive-pool");
        out["reordered"] = json!(canonical.swapped);
        println!("{out}");
    } else {
        println!("─── Pool Addresses ───────────────────────────────────────────────");
        print_pool(&pool);
        if canonical.swapped {
            println!();
            println!("  SOL moved to slot A.");
        }
    }
    Ok(())
}

// ─── create-pool / add-liquidity ─────────────────────────────────────────────

async fn cmd_deposit(
    client:   &Client,
    cli:      &Cli,
    pair:     &str,
    amount_a: f64,
    amount_b: f64,
    create:   bool,
) -> Result<()> {
    let (token_a, token_b) = resolve_pair(client, pair).await?;
    let sender = sender(cli)?;

    let (command, out) = if create {
        let params = CreatePoolParams { token_a, token_b, amount_a, amount_b };
        ("create-pool", client.create_pool(&sender, params).await.context("create-pool transaction failed")?)
    } else {
        let params = AddLiquidityParams { token_a, token_b, amount_a, amount_b };
        ("add-liquidity", client.add_liquidity(&sender, params).await.context("add-liquidity transaction failed")?)
    };

    if cli.json {
        let mut body = to_json(&out)?;
        body["status"] = json!("ok");
        body["command"] = json!(command);
        println!("{body}");
    } else {
        println!("─── {} ───────────────────────────────────────────────────", if create { "Pool Created " } else { "Liquidity Added" });
        print_pool(&out.pool);
        println!("  Deposited A      {} base units", out.amount_a);
        println!("  Deposited B      {} base units", out.amount_b);
        println!("  Transaction      {}", out.signature);
    }
    Ok(())
}

// ─── remove-liquidity ────────────────────────────────────────────────────────

async fn cmd_remove_liquidity(
    client:      &Client,
    cli:         &Cli,
    pair:        &str,
    lp_amount:   f64,
    lp_decimals: u8,
) -> Result<()> {
    let (token_a, token_b) = resolve_pair(client, pair).await?;
    let sender = sender(cli)?;
    let out = client
        .remove_liquidity(&sender, RemoveLiquidityParams { token_a, token_b, lp_amount, lp_decimals })
        .await
        .context("remove-liquidity transaction failed")?;

    if cli.json {
        let mut body = to_json(&out)?;
        body["status"] = json!("ok");
        body["command"] = json!("remove-liquidity");
        body["lp_burned"] = json!(out.amount_a);
        println!("{body}");
    } else {
        println!("─── Liquidity Removed ────────────────────────────────────────────");
        print_pool(&out.pool);
        println!("  LP burned        {} base units", out.amount_a);
        println!("  Transaction      {}", out.signature);
    }
    Ok(())
}

// ─── swap ────────────────────────────────────────────────────────────────────

async fn cmd_swap(
    client:    &Client,
    cli:       &Cli,
    token_in:  &str,
    token_out: &str,
    amount:    f64,
    locate:    bool,
) -> Result<()> {
    let from = resolve_token(client, token_in).await.context("--in")?;
    let to = resolve_token(client, token_out).await.context("--out")?;
    let sender = sender(cli)?;

    let out = if locate {
        let pool = client.locate_pool(&from, &to).await?;
        client.swap_in_pool(&sender, &pool, &from, amount).await
    } else {
        client.swap(&sender, SwapParams { from_token: from.clone(), to_token: to.clone(), amount_in: amount }).await
    }
    .context("swap transaction failed")?;

    if cli.json {
        let mut body = to_json(&out)?;
        body["status"] = json!("ok");
        body["command"] = json!("swap");
        body["in"] = json!(from.address);
        body["out"] = json!(to.address);
        println!("{body}");
    } else {
        println!("─── Swap Executed ────────────────────────────────────────────────");
        println!("  Sold             {} base units of {}", out.amount_in, from.symbol);
        println!("  Bought           {}", to.symbol);
        println!("  Pool             {}", out.pool.address);
        println!("  Direction        {}", if out.a_to_b { "A → B" } else { "B → A" });
        println!("  Transaction      {}", out.signature);
    }
    Ok(())
}

// ─── transfer ────────────────────────────────────────────────────────────────

async fn cmd_transfer(
    client:     &Client,
    cli:        &Cli,
    to:         &str,
    amount:     f64,
    token:      Option<&str>,
    token_2022: bool,
) -> Result<()> {
    let sender = sender(cli)?;
    let (symbol, out) = match token {
        None => (
            "SOL".to_string(),
            client
                .transfer_sol(&sender, TransferParams { recipient: to.to_string(), amount })
                .await
                .context("transfer failed")?,
        ),
        Some(t) => {
            let token = resolve_token(client, t).await?;
            let token_program = if token_2022 { TokenProgram::Token2022 } else { TokenProgram::Spl };
            let symbol = token.symbol.clone();
            let params = TokenTransferParams { token, recipient: to.to_string(), amount, token_program };
            (symbol, client.transfer_token(&sender, params).await.context("token transfer failed")?)
        }
    };

    if cli.json {
        let mut body = to_json(&out)?;
        body["status"] = json!("ok");
        body["command"] = json!("transfer");
        body["token"] = json!(symbol);
        body["from"] = json!(sender.pubkey().to_string());
        println!("{body}");
    } else {
        println!("─── Transfer Sent ────────────────────────────────────────────────");
        println!("  From             {}", sender.pubkey());
        println!("  To               {}", out.recipient);
        println!("  Amount           {} base units of {symbol}", out.amount);
        println!("  Transaction      {}", out.signature);
    }
    Ok(())
}

// ─── create-token / create-nft ───────────────────────────────────────────────

async fn cmd_create_token(
    client:   &Client,
    cli:      &Cli,
    params:   CreateTokenParams,
    count:    usize,
    attempts: u32,
) -> Result<()> {
    let sender = sender(cli)?;

    let batch: Vec<CreateTokenParams> = if count <= 1 {
        vec![params]
    } else {
        (1..=count)
            .map(|i| CreateTokenParams {
                name:   format!("{} #{i}", params.name),
                symbol: format!("{}{i}", params.symbol),
                ..params.clone()
            })
            .collect()
    };

    let outcome = client
        .create_tokens(&sender, &batch, RetryPolicy::new(attempts, std::time::Duration::from_secs(2)))
        .await;

    if cli.json {
        let created = to_json(&outcome.completed)?;
        println!("{}", json!({
            "status":  if outcome.is_complete() { "ok" } else { "partial" },
            "command": "create-token",
            "program": TOKEN_2022_PROGRAM_ID.to_string(),
            "created": created,
            "failed":  outcome.failure.as_ref().map(|f| json!({
                "index": f.index,
                "error": f.error.to_string(),
            })),
        }));
    } else {
        println!("─── Tokens Created ───────────────────────────────────────────────");
        for (token, p) in outcome.completed.iter().zip(&batch) {
            println!("  {:<16} {}", p.symbol, token.mint);
            println!("  {:<16} {} base units in {}", "", token.supply, token.token_account);
            println!("  {:<16} {}", "", token.signature);
        }
    }

    match outcome.failure {
        None => Ok(()),
        Some(f) => Err(anyhow!(f.error).context(format!(
            "token {} of {} failed; {} created before it",
            f.index + 1,
            batch.len(),
            f.index
        ))),
    }
}

async fn cmd_create_nft(client: &Client, cli: &Cli, params: CreateNftParams) -> Result<()> {
    let sender = sender(cli)?;
    let name = params.name.clone();
    let out = client.create_nft(&sender, params).await.context("create-nft transaction failed")?;

    if cli.json {
        let mut body = to_json(&out)?;
        body["status"] = json!("ok");
        body["command"] = json!("create-nft");
        body["name"] = json!(name);
        println!("{body}");
    } else {
        println!("─── NFT Created ──────────────────────────────────────────────────");
        println!("  Name             {name}");
        println!("  Mint             {}", out.mint);
        println!("  Holder account   {}", out.token_account);
        println!("  Transaction      {}", out.signature);
    }
    Ok(())
}
