use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::Mutex;

use crate::error::ExecutionError;
use crate::types::{Order, OrderStatus, Side};

/// Open orders for one symbol, shared between the engine and the fill feed.
#[derive(Clone)]
pub struct ActiveOrderBook {
    symbol: String,
    orders: Arc<Mutex<HashMap<String, Order>>>,
    backup_path: Option<PathBuf>,
}

impl ActiveOrderBook {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            orders: Arc::new(Mutex::new(HashMap::new())),
            backup_path: None,
        }
    }

    pub fn with_backup_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.backup_path = Some(path.into());
        self
    }

    pub async fn add(&self, orders: &[Order]) {
        let mut book = self.orders.lock().await;
        for order in orders {
            if order.symbol != self.symbol {
                warn!("Ignoring order {} for foreign symbol {}", order.id, order.symbol);
                continue;
            }
            book.insert(order.id.clone(), order.clone());
        }
    }

    pub async fn remove(&self, id: &str) -> Option<Order> {
        self.orders.lock().await.remove(id)
    }

    /// Drops a filled order from the book. Returns the filled order only when it was tracked here.
    pub async fn mark_filled(&self, filled: &Order) -> Option<Order> {
        let mut order = self.orders.lock().await.remove(&filled.id)?;
        order.status = OrderStatus::Filled;
        order.quantity = filled.quantity;
        Some(order)
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.orders.lock().await.values().cloned().collect()
    }

    pub async fn orders_by_side(&self, side: Side) -> Vec<Order> {
        self.orders
            .lock()
            .await
            .values()
            .filter(|o| o.side == side)
            .cloned()
            .collect()
    }

    pub async fn num_of_orders(&self) -> usize {
        self.orders.lock().await.len()
    }

    /// Writes the open orders to the backup file, if one is configured.
    pub async fn backup(&self) -> Result<(), ExecutionError> {
        let Some(path) = &self.backup_path else {
            return Ok(());
        };

        let orders = self.orders().await;
        let json = serde_json::to_vec_pretty(&orders)?;
        tokio::fs::write(path, json).await?;
        info!("Backed up {} open orders to {}", orders.len(), path.display());
        Ok(())
    }

    /// Loads orders from a previous backup and returns them so the executor can be told about them.
    /// A missing file is not an error.
    pub async fn restore(&self, path: &Path) -> Result<Vec<Order>, ExecutionError> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut orders: Vec<Order> = serde_json::from_slice(&raw)?;
        orders.retain(|o| o.symbol == self.symbol);
        self.add(&orders).await;
        Ok(orders)
    }
}
