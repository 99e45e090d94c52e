mod config;
mod error;
mod execution;
mod market_data;
mod strategy;
mod types;

#[cfg(test)]
mod testkit;

use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;

use crate::config::StrategyConfig;
use crate::execution::order_book::ActiveOrderBook;
use crate::execution::paper::PaperExchange;
use crate::market_data::LastPrice;
use crate::strategy::ChaserStrategy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logger();

    log::info!("Chaser Trading Bot Starting...");

    let config = load_config()?
        .resolve()
        .context("strategy configuration rejected")?;
    let instance_id = config.instance_id();
    log::info!("Instance: {}", instance_id);

    let prices_path = PathBuf::from(
        env::var("CHASER_PRICES").context("CHASER_PRICES must point at a price file")?,
    );
    let replay_interval = match env::var("CHASER_REPLAY_INTERVAL_MS") {
        Ok(raw) => Duration::from_millis(raw.parse().context("CHASER_REPLAY_INTERVAL_MS")?),
        Err(_) => Duration::from_secs(1),
    };
    let backup_path = env::var("CHASER_BACKUP_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(format!("{}.orders.json", instance_id)));

    let book = ActiveOrderBook::new(&config.symbol).with_backup_path(&backup_path);
    let exchange = Arc::new(PaperExchange::new());

    let restored = book.restore(&backup_path).await?;
    if !restored.is_empty() {
        exchange.rest(&restored);
        log::info!("Restored {} orders from {}", restored.len(), backup_path.display());
    }

    let last_price = LastPrice::new();
    let engine = ChaserStrategy::new(config, book.clone(), exchange.clone(), Arc::new(last_price.clone()))?;

    let (price_tx, mut price_rx) = mpsc::channel(64);

    // Spawn price feed
    let replay = tokio::spawn(async move {
        if let Err(e) = market_data::replay::start_price_replay(&prices_path, replay_interval, price_tx).await {
            log::error!("Price replay failed: {:#}", e);
        }
    });

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            close = price_rx.recv() => {
                let Some(close) = close else {
                    log::info!("Price feed finished");
                    break;
                };

                last_price.update(close);
                for filled in exchange.match_price(close) {
                    if let Some(order) = book.mark_filled(&filled).await {
                        engine.on_filled(order).await;
                    }
                }

                let decision = engine.on_price(close).await;
                log::debug!("{} close {} -> {:?}", engine.config().symbol, close, decision);
            }
            _ = &mut shutdown => {
                log::info!("Shutdown signal received");
                break;
            }
        }
    }

    engine.shutdown().await;
    replay.abort();

    let snapshot = engine.snapshot().await;
    log::info!(
        "Stopped | resting paper orders: {} | open sells: {} | ceiling: {} | profit: {} {}",
        exchange.resting_orders(),
        snapshot.open_sell_orders_count,
        snapshot.maximum_allowed_open_sell_orders,
        snapshot.accumulated_net_profit,
        engine.config().quote_currency
    );

    Ok(())
}

fn load_config() -> anyhow::Result<StrategyConfig> {
    let config = match env::var("CHASER_CONFIG") {
        Ok(path) => StrategyConfig::from_toml_file(&path)
            .with_context(|| format!("loading strategy config from {}", path))?,
        Err(_) => StrategyConfig::from_env().context("loading strategy config from environment")?,
    };
    Ok(config)
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|f, record| {
            writeln!(
                f,
                "[{} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}
