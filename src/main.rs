//! CLI entry point for the gateway client.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use opend_client::{
    CandlePeriod, Config, InstrumentType, Market, MarketData, OrderKind, Record, SessionProvider,
    Side, Trading, session,
};

#[derive(Parser)]
#[command(name = "opendctl")]
#[command(about = "Query and trade through a local OpenD-style gateway")]
#[command(version)]
struct Cli {
    /// Path to config.toml (built-in defaults are used when the file is absent)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check gateway connectivity
    Status,

    /// Real-time quotes for one or more symbols
    Quote {
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Historical candles for a symbol
    Candles {
        symbol: String,

        /// 1m/5m/15m/30m/60m/day/week/month/year (unrecognized = day)
        #[arg(long, default_value = "day")]
        period: String,

        #[arg(long, default_value_t = 100)]
        count: u32,
    },

    /// Market snapshot for one or more symbols
    Snapshot {
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Current subscription table
    Subscriptions,

    /// Instrument metadata for a market
    Symbols {
        /// Defaults to the configured market
        #[arg(long)]
        market: Option<Market>,

        #[arg(long, default_value = "STOCK")]
        instrument_type: InstrumentType,
    },

    /// Current positions
    Positions {
        #[arg(long)]
        symbol: Option<String>,
    },

    /// Today's orders
    Orders {
        /// Only orders still waiting on the exchange
        #[arg(long, conflicts_with = "filled")]
        pending: bool,

        /// Only filled orders
        #[arg(long)]
        filled: bool,
    },

    /// Account record for the configured environment
    Account,

    /// Maximum tradable quantity for a symbol at a price
    MaxQty { symbol: String, price: f64 },

    /// Place an order (price 0 = market order)
    Place {
        symbol: String,
        price: f64,
        quantity: u64,

        #[arg(long, default_value = "buy")]
        side: Side,

        #[arg(long, default_value = "limit")]
        kind: OrderKind,
    },

    /// Cancel one pending order
    Cancel { order_id: String },

    /// Cancel every pending order
    CancelAll,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {e}");
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    if let Err(e) = run(&config, cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(config: &Config, command: Command) -> opend_client::Result<()> {
    let provider = SessionProvider::from_config(config);
    let market_data = MarketData::new(&provider);
    let trading = match &config.trading.account_id {
        Some(id) => Trading::new(&provider, config.trading.market).with_account(id),
        None => Trading::new(&provider, config.trading.market),
    };

    match command {
        Command::Status => {
            session::check_connection(&provider)?;
            println!(
                "Gateway at {} is reachable ({}).",
                config.address(),
                config.trading.environment
            );
        }
        Command::Quote { symbols } => print_rows(&market_data.get_quote(symbols)?),
        Command::Candles {
            symbol,
            period,
            count,
        } => {
            let period = CandlePeriod::from(period.as_str());
            print_rows(&market_data.get_candles(&symbol, period, count, None, None)?);
        }
        Command::Snapshot { symbols } => print_rows(&market_data.get_snapshot(symbols)?),
        Command::Subscriptions => print_rows(&market_data.list_subscriptions()?),
        Command::Symbols {
            market,
            instrument_type,
        } => {
            let market = market.unwrap_or(config.trading.market);
            print_rows(&market_data.get_symbol_info(market, instrument_type)?);
        }
        Command::Positions { symbol } => {
            print_rows(&trading.list_positions(symbol.as_deref())?)
        }
        Command::Orders { pending, filled } => {
            let orders = if pending {
                trading.get_pending_orders()?
            } else if filled {
                trading.get_filled_orders()?
            } else {
                trading.list_orders(&[])?
            };
            print_rows(&orders);
        }
        Command::Account => match trading.get_account_info(config.trading.environment)? {
            Some(record) => print_rows(std::slice::from_ref(&record)),
            None => println!(
                "No {} account found.",
                config.trading.environment
            ),
        },
        Command::MaxQty { symbol, price } => {
            print_rows(std::slice::from_ref(
                &trading.get_max_tradable_quantity(&symbol, price)?,
            ));
        }
        Command::Place {
            symbol,
            price,
            quantity,
            side,
            kind,
        } => {
            let result = trading.place_order(&symbol, price, quantity, side, kind)?;
            match &result.order_id {
                Some(id) => println!("Order placed: {id}"),
                None => println!("Order placed (no id returned)."),
            }
            print_rows(&result.records);
        }
        Command::Cancel { order_id } => {
            let result = trading.cancel_order(&order_id)?;
            println!("Order {} cancelled.", result.order_id);
            print_rows(&result.records);
        }
        Command::CancelAll => {
            let outcomes = trading.cancel_all_pending()?;
            if outcomes.is_empty() {
                println!("No pending orders.");
            }
            for outcome in &outcomes {
                match outcome {
                    opend_client::CancelOutcome::Cancelled(result) => {
                        println!("cancelled {}", result.order_id)
                    }
                    opend_client::CancelOutcome::Failed { order_id, error } => println!(
                        "failed {}: {error}",
                        order_id.as_deref().unwrap_or("(unknown)")
                    ),
                }
            }
        }
    }

    Ok(())
}

fn print_rows(rows: &[Record]) {
    if rows.is_empty() {
        println!("(no rows)");
        return;
    }
    for row in rows {
        match serde_json::to_string_pretty(row) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("(unprintable row: {e})"),
        }
    }
}
