pub mod export;
pub mod summary;
pub mod tables;
pub mod timeseries;
pub mod trades;

pub use export::{save_bars_csv, save_results_json, write_bars_csv};
pub use summary::SummaryMetrics;
pub use tables::{orders_table, positions_table};
pub use timeseries::{cagr, calculate_equity_curve, max_drawdown, EquityPoint};
pub use trades::{closed_trades, ClosedTrade};
