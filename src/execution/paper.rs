use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::ExecutionError;
use crate::execution::OrderExecutor;
use crate::types::{Order, OrderStatus, Side, SubmitOrder};

/// Simulated exchange. Resting limit orders fill at their limit price once the market trades through them.
#[derive(Default)]
pub struct PaperExchange {
    resting: Mutex<HashMap<String, Order>>,
}

impl PaperExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills every resting order the given price crosses.
    pub fn match_price(&self, price: Decimal) -> Vec<Order> {
        let mut resting = self.resting.lock();
        let crossed: Vec<String> = resting
            .values()
            .filter(|o| match o.side {
                Side::Buy => o.price >= price,
                Side::Sell => o.price <= price,
            })
            .map(|o| o.id.clone())
            .collect();

        crossed
            .into_iter()
            .filter_map(|id| resting.remove(&id))
            .map(|mut order| {
                order.status = OrderStatus::Filled;
                debug!("Paper fill | {} {} @ {} | ClOrdID: {}", order.side, order.quantity, order.price, order.id);
                order
            })
            .collect()
    }

    /// Puts already-accepted orders (e.g. restored from a backup) back on the book.
    pub fn rest(&self, orders: &[Order]) {
        let mut resting = self.resting.lock();
        for order in orders {
            resting.insert(order.id.clone(), order.clone());
        }
    }

    pub fn resting_orders(&self) -> usize {
        self.resting.lock().len()
    }
}

#[async_trait]
impl OrderExecutor for PaperExchange {
    async fn submit(&self, order: SubmitOrder) -> Result<Vec<Order>, ExecutionError> {
        if order.price <= Decimal::ZERO {
            return Err(ExecutionError::Rejected(format!("price {} must be positive", order.price)));
        }
        if order.quantity <= Decimal::ZERO {
            return Err(ExecutionError::Rejected(format!(
                "quantity {} must be positive",
                order.quantity
            )));
        }

        let created = Order {
            id: Uuid::new_v4().to_string(),
            symbol: order.symbol,
            side: order.side,
            order_type: order.order_type,
            price: order.price,
            quantity: order.quantity,
            status: OrderStatus::New,
        };
        self.resting.lock().insert(created.id.clone(), created.clone());
        Ok(vec![created])
    }

    async fn cancel(&self, order: &Order) -> Result<(), ExecutionError> {
        self.resting
            .lock()
            .remove(&order.id)
            .map(|_| ())
            .ok_or_else(|| ExecutionError::UnknownOrder(order.id.clone()))
    }
}
