use crate::strategy::admission::Admission;
use crate::strategy::profit::ProfitStats;

/// Mutable strategy state. Lives behind the engine's mutex for the whole run.
#[derive(Debug)]
pub struct EngineState {
    pub admission: Admission,
    /// Sells issued since the last sell fill.
    pub open_sell_orders_count: usize,
    /// Backlog ceiling. Ratchets up by `wait_after` every time a cooldown lifts.
    pub maximum_allowed_open_sell_orders: usize,
    pub profit: ProfitStats,
    pub shutting_down: bool,
}

impl EngineState {
    pub fn new(wait_after: usize) -> Self {
        Self {
            admission: Admission::default(),
            open_sell_orders_count: 0,
            maximum_allowed_open_sell_orders: wait_after,
            profit: ProfitStats::default(),
            shutting_down: false,
        }
    }

    pub fn block_new_orders(&self) -> bool {
        self.admission.is_suspended()
    }

    pub fn backlog_full(&self) -> bool {
        self.open_sell_orders_count >= self.maximum_allowed_open_sell_orders
    }

    /// Ends the suspension armed as `generation` and raises the ceiling.
    /// No-op once shutdown has begun or when a newer suspension is in place.
    pub fn lift_suspension(&mut self, generation: u64, wait_after: usize) -> bool {
        if self.shutting_down || !self.admission.lift(generation) {
            return false;
        }
        self.maximum_allowed_open_sell_orders += wait_after;
        true
    }
}

/// Point-in-time view of [`EngineState`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub block_new_orders: bool,
    pub open_sell_orders_count: usize,
    pub maximum_allowed_open_sell_orders: usize,
    pub accumulated_net_profit: rust_decimal::Decimal,
}

impl From<&EngineState> for EngineSnapshot {
    fn from(state: &EngineState) -> Self {
        Self {
            block_new_orders: state.block_new_orders(),
            open_sell_orders_count: state.open_sell_orders_count,
            maximum_allowed_open_sell_orders: state.maximum_allowed_open_sell_orders,
            accumulated_net_profit: state.profit.accumulated_net_profit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifting_ratchets_the_ceiling() {
        let mut state = EngineState::new(2);
        state.open_sell_orders_count = 2;
        assert!(state.backlog_full());

        let generation = state.admission.try_suspend().unwrap();
        assert!(state.block_new_orders());
        assert!(state.lift_suspension(generation, 2));

        assert!(!state.block_new_orders());
        assert_eq!(state.maximum_allowed_open_sell_orders, 4);
        assert!(!state.backlog_full());
    }

    #[test]
    fn lifting_after_shutdown_is_a_no_op() {
        let mut state = EngineState::new(2);
        let generation = state.admission.try_suspend().unwrap();
        state.shutting_down = true;

        assert!(!state.lift_suspension(generation, 2));
        assert!(state.block_new_orders());
        assert_eq!(state.maximum_allowed_open_sell_orders, 2);
    }
}
