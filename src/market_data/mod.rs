pub mod replay;

use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;

/// Latest traded price for the strategy symbol.
pub trait PriceSource: Send + Sync {
    fn last_price(&self) -> Option<Decimal>;
}

/// Shared cell holding the most recent close seen on the price feed.
#[derive(Clone, Default)]
pub struct LastPrice {
    inner: Arc<RwLock<Option<Decimal>>>,
}

impl LastPrice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, price: Decimal) {
        *self.inner.write() = Some(price);
    }
}

impl PriceSource for LastPrice {
    fn last_price(&self) -> Option<Decimal> {
        *self.inner.read()
    }
}
