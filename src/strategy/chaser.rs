use std::sync::Arc;

use log::{error, info, warn};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

use crate::config::StrategyConfig;
use crate::error::ConfigError;
use crate::execution::order_book::ActiveOrderBook;
use crate::execution::OrderExecutor;
use crate::market_data::PriceSource;
use crate::strategy::state::{EngineSnapshot, EngineState};
use crate::types::{Order, Side, SubmitOrder};

/// What a price tick ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum TickDecision {
    Submitted(Vec<Order>),
    SubmitFailed,
    Blocked,
    TooManyOrders,
    BuyOrderOpen,
    Suspended,
    ShuttingDown,
}

/// Keeps one buy order trailing the market by `gap` and pairs every filled buy with a sell.
#[derive(Clone)]
pub struct ChaserStrategy {
    config: Arc<StrategyConfig>,
    orders: ActiveOrderBook,
    executor: Arc<dyn OrderExecutor>,
    prices: Arc<dyn PriceSource>,
    state: Arc<Mutex<EngineState>>,
}

impl ChaserStrategy {
    pub fn new(
        config: StrategyConfig,
        orders: ActiveOrderBook,
        executor: Arc<dyn OrderExecutor>,
        prices: Arc<dyn PriceSource>,
    ) -> Result<Self, ConfigError> {
        let config = config.resolve()?;
        info!("Gap between buy and sell: {} {}", config.gap, config.quote_currency);

        Ok(Self {
            state: Arc::new(Mutex::new(EngineState::new(config.wait_after))),
            config: Arc::new(config),
            orders,
            executor,
            prices,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot::from(&*self.state.lock().await)
    }

    /// Reacts to the close of the latest interval.
    pub async fn on_price(&self, current_price: Decimal) -> TickDecision {
        // Held for the whole tick so fills and timers never interleave with a decision.
        let mut state = self.state.lock().await;
        if state.shutting_down {
            return TickDecision::ShuttingDown;
        }

        self.cancel_stale_buys(current_price).await;

        if state.block_new_orders() {
            return TickDecision::Blocked;
        }

        if self.orders.num_of_orders().await >= self.config.max_number_of_orders {
            return TickDecision::TooManyOrders;
        }

        if !self.orders.orders_by_side(Side::Buy).await.is_empty() {
            return TickDecision::BuyOrderOpen;
        }

        if state.backlog_full() {
            info!(
                "Too many open sell orders ({}/{})... waiting {} minutes before resuming...",
                state.open_sell_orders_count,
                state.maximum_allowed_open_sell_orders,
                self.config.wait_minutes
            );
            if let Some(generation) = state.admission.try_suspend() {
                let timer = self.arm_cooldown(generation);
                state.admission.attach_timer(timer);
            }
            return TickDecision::Suspended;
        }

        let request = SubmitOrder::limit(
            &self.config.symbol,
            Side::Buy,
            current_price - self.config.gap,
            self.config.quantity,
        );
        match self.executor.submit(request).await {
            Ok(created) => {
                for order in &created {
                    info!("BUY @ {} | Qty: {} | ClOrdID: {}", order.price, order.quantity, order.id);
                }
                self.orders.add(&created).await;
                TickDecision::Submitted(created)
            }
            Err(e) => {
                error!("Can not submit buy order: {}", e);
                TickDecision::SubmitFailed
            }
        }
    }

    /// Cancels buys whose paired sell target has fallen `max_distance` or more behind the market.
    async fn cancel_stale_buys(&self, current_price: Decimal) {
        for order in self.orders.orders_by_side(Side::Buy).await {
            let distance = current_price - (order.price + self.config.gap);
            if distance < self.config.max_distance {
                continue;
            }

            info!("Cancelling stale buy {} @ {} | distance: {}", order.id, order.price, distance);
            match self.executor.cancel(&order).await {
                Ok(()) => {
                    self.orders.remove(&order.id).await;
                }
                Err(e) => error!("Can not cancel order {}: {}", order.id, e),
            }
        }
    }

    fn arm_cooldown(&self, generation: u64) -> AbortHandle {
        let state = Arc::clone(&self.state);
        let cooldown = self.config.cooldown();
        let wait_after = self.config.wait_after;

        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            let mut state = state.lock().await;
            if state.lift_suspension(generation, wait_after) {
                info!(
                    "Lifting transaction ban... allowing up to {} open sell orders",
                    state.maximum_allowed_open_sell_orders
                );
            }
        })
        .abort_handle()
    }

    /// Reacts to an order of ours being filled.
    pub async fn on_filled(&self, order: Order) {
        let mut state = self.state.lock().await;
        if state.shutting_down {
            warn!("Ignoring fill of {} during shutdown", order.id);
            return;
        }

        state.profit.add_fill(&order);

        if order.side == Side::Sell {
            info!(
                "Profit: {} {}",
                state.profit.accumulated_net_profit, self.config.quote_currency
            );
            state.open_sell_orders_count = 0;
            return;
        }

        let mut sell_price = order.price + self.config.gap;
        if let Some(current_price) = self.prices.last_price() {
            if current_price > sell_price {
                info!(
                    "Current price {} is higher than the target {}... selling at current price instead.",
                    current_price, sell_price
                );
                sell_price = current_price;
            }
        }

        let request = SubmitOrder::limit(&self.config.symbol, Side::Sell, sell_price, order.quantity);
        match self.executor.submit(request).await {
            Ok(created) => {
                for sell in &created {
                    info!("SELL @ {} | Qty: {} | ClOrdID: {}", sell.price, sell.quantity, sell.id);
                }
                self.orders.add(&created).await;
            }
            // No retry: the filled buy stays unpaired.
            Err(e) => error!("Can not submit sell order for filled buy {}: {}", order.id, e),
        }
        state.open_sell_orders_count += 1;
    }

    /// Backs up the open orders and cancels every open buy. Later events and timers become no-ops.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if state.shutting_down {
            return;
        }
        state.shutting_down = true;
        state.admission.cancel_timer();

        if let Err(e) = self.orders.backup().await {
            error!("Order backup error: {}", e);
        }

        info!("Canceling active orders...");
        let mut cancelled = 0;
        for order in self.orders.orders_by_side(Side::Buy).await {
            match self.executor.cancel(&order).await {
                Ok(()) => {
                    self.orders.remove(&order.id).await;
                    cancelled += 1;
                }
                Err(e) => error!("Cancel order error: {}", e),
            }
        }

        // The backup above still lists the buys just cancelled; a restart must not bring them back.
        if cancelled > 0 {
            if let Err(e) = self.orders.backup().await {
                error!("Order backup error: {}", e);
            }
        }
    }
}
