//a bar-driven backtesting engine for lots of cash and margined instruments

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod instrument;
pub mod metrics;
pub mod portfolio;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{BacktestConfiguration, SmaParams, StrategyType};
    pub use crate::data::{
        load_csv, resolve_bar, to_columns, BarData, BarSource, CsvBarSource, IterSource,
        PriceType, ResolvedBarDatum,
    };
    pub use crate::engine::{
        rank_by_equity, run_sweep, BacktestConfig, BacktestEngine, BarResult, Order, SweepRun,
    };
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::instrument::{ContractBook, ContractSpec, MarginSpec};
    pub use crate::metrics::{
        calculate_equity_curve, closed_trades, save_bars_csv, save_results_json, ClosedTrade,
        EquityPoint, SummaryMetrics,
    };
    pub use crate::portfolio::{OpeningSnapshot, Position, PositionSpec};
    pub use crate::strategy::{
        from_fn, sma_crossover::SmaCrossoverStrategy, ParameterGrid, Strategy, StrategyContext,
    };
}
