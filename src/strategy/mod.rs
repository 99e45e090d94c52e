pub mod admission;
pub mod chaser;
pub mod profit;
pub mod state;

pub use chaser::ChaserStrategy;
