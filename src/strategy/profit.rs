use rust_decimal::Decimal;

use crate::types::{Order, Side};

/// Average-cost position tracking for realized profit.
#[derive(Debug, Default, Clone)]
pub struct ProfitStats {
    position: Decimal,
    average_cost: Decimal,
    pub accumulated_net_profit: Decimal,
    pub trades: usize,
}

impl ProfitStats {
    pub fn add_fill(&mut self, order: &Order) {
        self.trades += 1;

        match order.side {
            Side::Buy => {
                let position = self.position + order.quantity;
                if !position.is_zero() {
                    self.average_cost =
                        (self.average_cost * self.position + order.price * order.quantity) / position;
                }
                self.position = position;
            }
            Side::Sell => {
                // Sells beyond the tracked position (e.g. restored from a backup) have no known cost.
                let matched = order.quantity.min(self.position);
                self.accumulated_net_profit += (order.price - self.average_cost) * matched;
                self.position -= matched;
                if self.position.is_zero() {
                    self.average_cost = Decimal::ZERO;
                }
            }
        }
    }
}
