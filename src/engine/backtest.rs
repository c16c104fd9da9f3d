use crate::data::{resolve_bar, BarData, BarSource, PriceType};
use crate::engine::execution::execute_orders;
use crate::engine::ids::IdAllocator;
use crate::engine::orders::{validate_orders, Order};
use crate::engine::prices::update_prices;
use crate::error::{EngineError, EngineResult};
use crate::metrics::tables::{orders_table, positions_table};
use crate::portfolio::{total_value, Position};
use crate::strategy::{Strategy, StrategyContext};
use chrono::{DateTime, Utc};
use log::{debug, info, log_enabled, Level};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

//state of one bar after it has been fully processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarResult {
    pub date: DateTime<Utc>,
    //orders the strategy created on this bar's close, executed on the next open
    pub orders: Vec<Order>,
    pub cash: f64,
    //value added to (positive) or released from (negative) lots by this bar's execution
    pub cost: f64,
    //previous lots, repriced at this bar's open
    pub positions_on_open: Vec<Position>,
    //lots right after the pending orders were executed, at the open price
    pub positions_after_trade: Vec<Position>,
    //lots at this bar's close
    pub positions_on_close: Vec<Position>,
    //lots (or parts of lots) closed on this bar, at the open price
    pub closed_positions: Vec<Position>,
}

impl BarResult {
    pub fn positions_value(&self) -> f64 {
        total_value(&self.positions_on_close)
    }

    //cash plus the close value of all held lots
    pub fn equity(&self) -> f64 {
        self.cash + self.positions_value()
    }
}

//configuration for a backtest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    //number of bars handed to the strategy; all bars if none
    pub history_length: Option<usize>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: 100000.0,
            history_length: None,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !self.initial_cash.is_finite() {
            return Err(EngineError::argument(
                "cash",
                "a finite number",
                self.initial_cash,
            ));
        }
        Ok(())
    }
}

//main backtest engine
//
//every bar runs through the same steps: age the previous close lots to the open,
//execute the orders created on the previous close, book the cost against cash,
//age the lots to the close and ask the strategy for the next bar's orders
pub struct BacktestEngine {
    config: BacktestConfig,
    ids: IdAllocator,
    history: VecDeque<Vec<BarData>>,
    results: Vec<BarResult>,

    //carried from one bar to the next
    cash: f64,
    positions: Vec<Position>,
    pending_orders: Vec<Order>,
    last_date: Option<DateTime<Utc>>,
}

impl BacktestEngine {
    //creates a new backtest engine
    pub fn new(config: BacktestConfig) -> EngineResult<Self> {
        config.validate()?;

        Ok(BacktestEngine {
            cash: config.initial_cash,
            config,
            ids: IdAllocator::new(),
            history: VecDeque::new(),
            results: Vec::new(),
            positions: Vec::new(),
            pending_orders: Vec::new(),
            last_date: None,
        })
    }

    //runs the backtest until the source is exhausted and returns one result per bar
    pub fn run<D, S>(mut self, source: &mut D, strategy: &mut S) -> EngineResult<Vec<BarResult>>
    where
        D: BarSource + ?Sized,
        S: Strategy + ?Sized,
    {
        info!(
            "Running backtest with strategy {} and cash {:.2}",
            strategy.name(),
            self.cash
        );

        while let Some(bar) = source.next_bar().map_err(EngineError::DataSource)? {
            self.step(bar, strategy)?;
        }

        info!(
            "Backtest finished after {} bars, {} lots opened, final cash {:.2}",
            self.results.len(),
            self.ids.issued(),
            self.cash
        );

        Ok(self.results)
    }

    //processes a single bar
    pub fn step<S>(&mut self, bar: Vec<BarData>, strategy: &mut S) -> EngineResult<&BarResult>
    where
        S: Strategy + ?Sized,
    {
        let complemented = self.prepare_bar(&bar)?;
        let date = complemented[0].date;
        debug!("Bar {}", date);

        //open
        let on_open = resolve_bar(&complemented, PriceType::Open);
        let positions_on_open = update_prices(&self.positions, &on_open, true)?;
        self.log_positions("Positions on open", &positions_on_open);

        //ids and history are committed only once the whole bar succeeded
        let mut ids = self.ids.clone();
        let execution = execute_orders(&self.pending_orders, &positions_on_open, &on_open, &mut ids)?;
        self.log_positions("Positions after execution", &execution.current_positions);
        self.log_positions("Closed positions", &execution.closed_positions);

        let value_before = total_value(&positions_on_open);
        let value_after = total_value(&execution.current_positions);
        let cost = value_after - value_before;
        let cash = self.cash - cost;
        debug!(
            "Cost {:.4}; value before execution {:.4}, after execution {:.4}",
            cost, value_before, value_after
        );

        //close
        let on_close = resolve_bar(&complemented, PriceType::Close);
        let positions_on_close = update_prices(&execution.current_positions, &on_close, false)?;
        self.log_positions("Positions on close", &positions_on_close);

        //the strategy sees the records as the source delivered them
        self.history.push_front(bar);
        let evicted = match self.config.history_length {
            Some(length) if self.history.len() > length => self.history.split_off(length),
            _ => VecDeque::new(),
        };

        let orders = {
            let context = StrategyContext {
                date,
                data: &self.history,
                cash,
                positions: &positions_on_close,
            };
            strategy
                .create_orders(&context)
                .map_err(|source| EngineError::Strategy { date, source })
        }
        .and_then(|orders| validate_orders(&orders).map(|_| orders));

        let orders = match orders {
            Ok(orders) => orders,
            Err(error) => {
                self.history.extend(evicted);
                self.history.pop_front();
                return Err(error);
            }
        };

        if log_enabled!(Level::Debug) {
            if orders.is_empty() {
                debug!("Orders: none");
            } else {
                debug!("Orders:\n{}", orders_table(&orders));
            }
        }

        self.ids = ids;
        self.cash = cash;
        self.positions = positions_on_close.clone();
        self.pending_orders = orders.clone();
        self.last_date = Some(date);

        self.results.push(BarResult {
            date,
            orders,
            cash,
            cost,
            positions_on_open,
            positions_after_trade: execution.current_positions,
            positions_on_close,
            closed_positions: execution.closed_positions,
        });

        Ok(&self.results[self.results.len() - 1])
    }

    //validates the raw records and fills in their defaults
    fn prepare_bar(&self, bar: &[BarData]) -> EngineResult<Vec<BarData>> {
        if bar.is_empty() {
            return Err(EngineError::argument(
                "bar",
                "a non-empty list of bar records",
                "[]",
            ));
        }

        let mut complemented = Vec::with_capacity(bar.len());
        for record in bar {
            record.validate()?;
            complemented.push(record.complement());
        }

        let date = complemented[0].date;
        if let Some(last_date) = self.last_date {
            if date < last_date {
                return Err(EngineError::invariant(format!(
                    "bar dates must not decrease, got {} after {}",
                    date, last_date
                )));
            }
        }

        Ok(complemented)
    }

    fn log_positions(&self, title: &str, positions: &[Position]) {
        if log_enabled!(Level::Debug) {
            debug!("{}:\n{}", title, positions_table(positions));
        }
    }

    //returns the results of all bars processed so far
    pub fn results(&self) -> &[BarResult] {
        &self.results
    }

    //returns the current cash
    pub fn cash(&self) -> f64 {
        self.cash
    }

    //returns the lots held at the last close
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    //returns the orders waiting for the next bar's open
    pub fn pending_orders(&self) -> &[Order] {
        &self.pending_orders
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }
}
