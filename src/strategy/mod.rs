pub mod parameters;
pub mod sma_crossover;

use crate::data::{close_prices, BarData};
use crate::engine::Order;
use crate::portfolio::{net_size, total_value, Position};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

pub use parameters::ParameterGrid;

//strategy interface: called once per bar, after the close, to propose the next bar's orders
//returned orders are executed at the next bar's open; an error aborts the backtest
pub trait Strategy {
    fn create_orders(&mut self, context: &StrategyContext<'_>) -> Result<Vec<Order>>;

    //returns the strategy name
    fn name(&self) -> &str {
        "custom"
    }
}

impl<S: Strategy + ?Sized> Strategy for &mut S {
    fn create_orders(&mut self, context: &StrategyContext<'_>) -> Result<Vec<Order>> {
        (**self).create_orders(context)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn create_orders(&mut self, context: &StrategyContext<'_>) -> Result<Vec<Order>> {
        (**self).create_orders(context)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

//adapts a closure to the strategy interface
pub struct FnStrategy<F> {
    create: F,
}

impl<F> Strategy for FnStrategy<F>
where
    F: FnMut(&StrategyContext<'_>) -> Result<Vec<Order>>,
{
    fn create_orders(&mut self, context: &StrategyContext<'_>) -> Result<Vec<Order>> {
        (self.create)(context)
    }
}

pub fn from_fn<F>(create: F) -> FnStrategy<F>
where
    F: FnMut(&StrategyContext<'_>) -> Result<Vec<Order>>,
{
    FnStrategy { create }
}

//state handed to a strategy at the close of a bar
pub struct StrategyContext<'a> {
    //date of the bar that just closed
    pub date: DateTime<Utc>,

    //raw bars, newest first, capped to the configured history length
    pub data: &'a VecDeque<Vec<BarData>>,

    //cash after this bar's order execution
    pub cash: f64,

    //lots valued at this bar's close
    pub positions: &'a [Position],
}

impl<'a> StrategyContext<'a> {
    //returns the bar that just closed
    pub fn latest_bar(&self) -> Option<&'a Vec<BarData>> {
        self.data.front()
    }

    //returns the latest record of a symbol, if the last bar contains it
    pub fn latest(&self, symbol: &str) -> Option<&'a BarData> {
        self.latest_bar()
            .and_then(|bar| bar.iter().find(|record| record.symbol == symbol))
    }

    //returns the number of bars in history
    pub fn bar_count(&self) -> usize {
        self.data.len()
    }

    //returns up to n close prices of a symbol, oldest first
    pub fn close_prices(&self, symbol: &str, n: usize) -> Vec<f64> {
        close_prices(self.data, symbol, n)
    }

    //aggregate signed size held in a symbol
    pub fn position_size(&self, symbol: &str) -> f64 {
        net_size(self.positions, symbol)
    }

    //cash plus the close value of all lots
    pub fn equity(&self) -> f64 {
        self.cash + total_value(self.positions)
    }
}

//helper function to calculate simple moving average
pub fn sma(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}
