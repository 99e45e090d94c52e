pub mod order_book;
pub mod paper;

use async_trait::async_trait;

use crate::error::ExecutionError;
use crate::types::{Order, SubmitOrder};

/// Submits and cancels orders against an exchange.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    async fn submit(&self, order: SubmitOrder) -> Result<Vec<Order>, ExecutionError>;

    async fn cancel(&self, order: &Order) -> Result<(), ExecutionError>;
}
