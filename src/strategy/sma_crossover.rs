use crate::engine::Order;
use crate::strategy::{sma, Strategy, StrategyContext};
use anyhow::Result;
use std::collections::HashMap;

//sma crossover strategy
//targets a long position of `size` while the fast sma is above the slow sma and a
//short position of `size` while it is below; each symbol is traded independently
#[derive(Debug, Clone)]
pub struct SmaCrossoverStrategy {
    symbols: Vec<String>,
    fast_window: usize,
    slow_window: usize,
    size: f64,

    //state
    last_signal: HashMap<String, Signal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Long,
    Short,
}

impl SmaCrossoverStrategy {
    //an empty symbol list trades every symbol of the latest bar
    pub fn new(symbols: Vec<String>, fast_window: usize, slow_window: usize, size: f64) -> Self {
        SmaCrossoverStrategy {
            symbols,
            fast_window,
            slow_window,
            size,
            last_signal: HashMap::new(),
        }
    }

    //returns the side the smas currently point to, none while history is too short
    fn signal(&self, closes: &[f64]) -> Option<Signal> {
        if closes.len() < self.slow_window {
            return None;
        }

        let fast_sma = sma(&closes[closes.len().saturating_sub(self.fast_window)..])?;
        let slow_sma = sma(closes)?;

        if fast_sma > slow_sma {
            Some(Signal::Long)
        } else if fast_sma < slow_sma {
            Some(Signal::Short)
        } else {
            None
        }
    }
}

impl Strategy for SmaCrossoverStrategy {
    fn create_orders(&mut self, context: &StrategyContext<'_>) -> Result<Vec<Order>> {
        let symbols: Vec<String> = if self.symbols.is_empty() {
            context
                .latest_bar()
                .map(|bar| bar.iter().map(|record| record.symbol.clone()).collect())
                .unwrap_or_default()
        } else {
            self.symbols.clone()
        };

        let mut orders = Vec::new();

        for symbol in symbols {
            let closes = context.close_prices(&symbol, self.slow_window);
            let signal = match self.signal(&closes) {
                Some(signal) => signal,
                None => continue,
            };

            //only act on a crossover
            if self.last_signal.get(&symbol) == Some(&signal) {
                continue;
            }

            let target = match signal {
                Signal::Long => self.size,
                Signal::Short => -self.size,
            };
            let current = context.position_size(&symbol);
            if target != current {
                orders.push(Order::new(symbol.clone(), target - current));
            }

            self.last_signal.insert(symbol, signal);
        }

        Ok(orders)
    }

    fn name(&self) -> &str {
        "SMA Crossover"
    }
}
