//! Fixtures and collaborator doubles shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::StrategyConfig;
use crate::error::ExecutionError;
use crate::execution::OrderExecutor;
use crate::types::{Order, OrderStatus, OrderType, Side, SubmitOrder};

/// quantity=1, gap=10, max_distance=50, max_number_of_orders=3, wait_after=2, wait_minutes=5.
pub fn config() -> StrategyConfig {
    StrategyConfig {
        symbol: "BTCUSDT".to_string(),
        quantity: dec!(1),
        gap: dec!(10),
        max_distance: dec!(50),
        max_number_of_orders: 3,
        wait_after: 2,
        wait_minutes: 5,
        profit: Decimal::ZERO,
        quote_currency: "USDT".to_string(),
    }
}

pub fn order(id: &str, side: Side, price: Decimal) -> Order {
    Order {
        id: id.to_string(),
        symbol: "BTCUSDT".to_string(),
        side,
        order_type: OrderType::Limit,
        price,
        quantity: dec!(1),
        status: OrderStatus::New,
    }
}

/// Executor that accepts everything (unless told to fail) and remembers what it saw.
#[derive(Default)]
pub struct RecordingExecutor {
    pub submitted: Mutex<Vec<SubmitOrder>>,
    pub cancel_attempts: Mutex<Vec<String>>,
    pub fail_submit: AtomicBool,
    pub fail_cancel: AtomicBool,
    next_id: AtomicUsize,
}

impl RecordingExecutor {
    pub fn submitted_by_side(&self, side: Side) -> Vec<SubmitOrder> {
        self.submitted
            .lock()
            .iter()
            .filter(|o| o.side == side)
            .cloned()
            .collect()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancel_attempts.lock().clone()
    }
}

#[async_trait]
impl OrderExecutor for RecordingExecutor {
    async fn submit(&self, order: SubmitOrder) -> Result<Vec<Order>, ExecutionError> {
        self.submitted.lock().push(order.clone());
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(ExecutionError::Rejected("scripted rejection".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(vec![Order {
            id: format!("ord-{id}"),
            symbol: order.symbol,
            side: order.side,
            order_type: order.order_type,
            price: order.price,
            quantity: order.quantity,
            status: OrderStatus::New,
        }])
    }

    async fn cancel(&self, order: &Order) -> Result<(), ExecutionError> {
        self.cancel_attempts.lock().push(order.id.clone());
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(ExecutionError::UnknownOrder(order.id.clone()));
        }
        Ok(())
    }
}
