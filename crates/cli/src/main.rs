//! Meretrix Command Line Interface
//!
//! Query the price curve, quote purchases, and run a simulated sale.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use meretrix_issuance::{buy, price, PurchaseRequest, SupplyState};
use meretrix_treasury::{PurchaseOrder, SaleConfig, SaleRoles, TokenSale};
use meretrix_types::{AccountId, Amount};
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Seconds a simulated order stays valid.
const ORDER_TTL_SECS: u64 = 3_600;

#[derive(Parser)]
#[command(name = "meretrix")]
#[command(about = "Meretrix token issuance command line interface", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Compact,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Unit price for a supply state
    Price {
        /// Total supply of the issuance
        #[arg(long)]
        total: Amount,
        /// Units already sold
        #[arg(long, default_value_t = 0)]
        sold: Amount,
    },
    /// Price and validate a purchase without executing it
    Quote {
        #[arg(long)]
        total: Amount,
        #[arg(long, default_value_t = 0)]
        sold: Amount,
        /// Units to buy
        #[arg(long)]
        amount: Amount,
        /// Buyer handle (e.g. @alice) or encoded account
        #[arg(long, default_value = "@buyer")]
        buyer: String,
    },
    /// Run a sequence of purchases against a fresh sale
    Simulate {
        /// Sale config (TOML); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Purchases as buyer:amount, executed in order
        #[arg(long = "buy", value_name = "BUYER:AMOUNT", required = true)]
        buys: Vec<String>,
    },
}

struct Rejection {
    buyer: AccountId,
    amount: Amount,
    error: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Price { total, sold } => handle_price(total, sold),
        Commands::Quote {
            total,
            sold,
            amount,
            buyer,
        } => handle_quote(total, sold, amount, &buyer),
        Commands::Simulate { config, buys } => handle_simulate(config, &buys),
    }
}

fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
    }
}

fn handle_price(total: Amount, sold: Amount) -> Result<()> {
    let unit_price = price(total, sold).context("pricing supply state")?;
    let json = json!({
        "total_supply": total.to_string(),
        "sold_supply": sold.to_string(),
        "unit_price": unit_price.to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn handle_quote(total: Amount, sold: Amount, amount: Amount, buyer: &str) -> Result<()> {
    let buyer = parse_account(buyer)?;
    let state = SupplyState::from_parts(total, sold);
    let result = buy(&PurchaseRequest::new(buyer, amount), &state).context("quoting purchase")?;
    let json = json!({
        "buyer": buyer,
        "amount": result.amount().to_string(),
        "unit_price": result.unit_price().to_string(),
        "cost": result.cost().to_string(),
        "new_sold_supply": result.new_sold_supply().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn handle_simulate(config: Option<PathBuf>, buys: &[String]) -> Result<()> {
    let config = SaleConfig::load(config.as_deref()).context("loading sale config")?;
    let deployer = AccountId::from_handle("@deployer");
    let sale = TokenSale::in_memory(config, SaleRoles::single(deployer))
        .context("opening sale")?;

    let now = u64::try_from(chrono::Utc::now().timestamp()).context("system clock before epoch")?;

    let mut receipts = Vec::new();
    let mut rejected = Vec::new();

    for entry in buys {
        let (buyer, amount) = parse_buy(entry)?;
        let unit_price = sale.current_price()?;
        let order = PurchaseOrder::exact(amount, unit_price, now + ORDER_TTL_SECS);

        match sale.buy(buyer, order, now) {
            Ok(receipt) => receipts.push(receipt),
            Err(err) => {
                warn!("Purchase {} rejected: {}", entry, err);
                rejected.push(Rejection {
                    buyer,
                    amount,
                    error: err.to_string(),
                });
            }
        }
    }

    let state = sale.supply_state();
    info!(
        "Simulation finished: {} accepted, {} rejected, sold {}/{}",
        receipts.len(),
        rejected.len(),
        state.sold_supply,
        state.total_supply
    );

    let accepted: Vec<_> = receipts
        .iter()
        .map(|r| {
            json!({
                "buyer": r.recipient,
                "amount": r.amount.to_string(),
                "unit_price": r.unit_price.to_string(),
                "cost": r.cost.to_string(),
                "sold_supply": r.sold_supply.to_string(),
            })
        })
        .collect();
    let rejected: Vec<_> = rejected
        .iter()
        .map(|r| {
            json!({
                "buyer": r.buyer,
                "amount": r.amount.to_string(),
                "error": r.error,
            })
        })
        .collect();

    let events = serde_json::to_value(sale.take_events()).context("encoding sale events")?;

    let json = json!({
        "token": { "name": sale.name(), "symbol": sale.symbol() },
        "receipts": accepted,
        "rejected": rejected,
        "sold_supply": state.sold_supply.to_string(),
        "remaining": state.remaining().to_string(),
        "unit_price": sale.current_price()?.to_string(),
        "proceeds": sale.proceeds().total_collected.to_string(),
        "events": events,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Encoded account (`m` + 64 hex) or a handle hashed into one.
fn parse_account(input: &str) -> Result<AccountId> {
    if input.is_empty() {
        bail!("account must not be empty");
    }
    Ok(input
        .parse()
        .unwrap_or_else(|_| AccountId::from_handle(input)))
}

/// Parse `buyer:amount`.
fn parse_buy(entry: &str) -> Result<(AccountId, Amount)> {
    let (buyer, amount) = entry
        .rsplit_once(':')
        .with_context(|| format!("expected BUYER:AMOUNT, got {entry:?}"))?;
    let amount = amount
        .trim()
        .parse()
        .with_context(|| format!("invalid amount in {entry:?}"))?;
    Ok((parse_account(buyer.trim())?, amount))
}
