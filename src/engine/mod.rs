pub mod backtest;
pub mod execution;
pub mod ids;
pub mod orders;
pub mod prices;
pub mod sweep;

pub use backtest::{BacktestConfig, BacktestEngine, BarResult};
pub use execution::{execute_orders, position_changes, Execution, PositionChanges};
pub use ids::IdAllocator;
pub use orders::{merge_orders, validate_orders, Order};
pub use prices::update_prices;
pub use sweep::{rank_by_equity, run_sweep, SweepRun};
