use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::future;
use itertools::{join, Itertools};
use price_feed::{Currency, FeedSettings, PriceAdapter, PriceFeed, PriceRecord};

/// Quote currencies from the configured price providers
#[derive(Parser)]
#[command(name = "price-feed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML or JSON) layered over the built-in providers
    #[arg(long)]
    config: Option<String>,

    /// Adapter to query instead of the configured default
    #[arg(long)]
    adapter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Quote one or more currencies
    Price {
        #[arg(required = true, num_args = 1..)]
        currencies: Vec<Currency>,
    },

    /// List currencies the adapter declares
    Currencies,

    /// List configured adapters
    Adapters,

    /// Quote one currency from every adapter that supports it
    Compare { currency: Currency },
}

fn describe(record: &PriceRecord) -> String {
    let unit = record.unit.map(|u| u.to_string()).unwrap_or_default();
    let mut line = format!("{} -> {:.2} {}", record.currency, record.price, unit);
    if let Some(change) = record.change_percentage_24h {
        line.push_str(&format!(" ({:+.2}%)", change));
    }
    line.push_str(&format!(" @ {}", record.timestamp.format("%Y-%m-%d %H:%M:%S")));
    line
}

async fn run(feed: &PriceFeed, adapter: Option<&str>, command: Command) -> Result<()> {
    match command {
        Command::Price { currencies } => {
            for currency in currencies {
                let record = feed
                    .get_price(currency, adapter)
                    .await
                    .with_context(|| format!("Quoting {}", currency))?;
                println!("{}", describe(&record));
            }
        }
        Command::Currencies => {
            let currencies = feed.get_supported_currencies(adapter)?;
            println!("{}", join(currencies.iter(), ", "));
        }
        Command::Adapters => {
            let default = feed.registry().default_adapter();
            for name in feed.list_adapters() {
                let marker = if name == default { " (default)" } else { "" };
                println!("{}{}", name, marker);
            }
        }
        Command::Compare { currency } => {
            let names = feed
                .list_adapters()
                .into_iter()
                .filter(|name| {
                    feed.adapter(Some(name.as_str()))
                        .map(|a| a.supports(currency))
                        .unwrap_or(false)
                })
                .collect_vec();
            if names.is_empty() {
                bail!("No configured adapter supports {}", currency);
            }
            let quotes = names.iter().map(|name| feed.get_price(currency, Some(name.as_str())));
            let results = future::join_all(quotes).await;
            let reply = names
                .iter()
                .zip(results.iter())
                .map(|(name, result)| match result {
                    Ok(record) => format!("{}: {}", name, describe(record)),
                    Err(error) => format!("{}: error during price retrieval: {:#}", name, error),
                })
                .join("\n");
            println!("{} Price:\n{}", currency, reply);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let settings = FeedSettings::load(cli.config.as_deref()).context("Loading settings")?;
    log::info!("Starting price-feed with default adapter [{}]", settings.default);
    let feed = PriceFeed::with_settings(settings).context("Building price feed")?;
    run(&feed, cli.adapter.as_deref(), cli.command).await
}
