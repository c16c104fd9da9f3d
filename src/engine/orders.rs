use crate::error::{EngineError, EngineResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

//desired traded quantity and direction at the next bar's open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    //positive buys, negative sells
    pub size: f64,
}

impl Order {
    pub fn new(symbol: impl Into<String>, size: f64) -> Self {
        Order {
            symbol: symbol.into(),
            size,
        }
    }
}

//merges all orders of one symbol into a single net order, keeping first-seen order
//net-zero results are kept (size 0) so that they show up as not executed
pub fn merge_orders(orders: &[Order]) -> Vec<Order> {
    let mut merged: IndexMap<&str, f64> = IndexMap::new();
    for order in orders {
        *merged.entry(order.symbol.as_str()).or_insert(0.0) += order.size;
    }
    merged
        .into_iter()
        .map(|(symbol, size)| Order::new(symbol, size))
        .collect()
}

//checks orders returned by a strategy
pub fn validate_orders(orders: &[Order]) -> EngineResult<()> {
    for (index, order) in orders.iter().enumerate() {
        if order.symbol.is_empty() {
            return Err(EngineError::argument(
                format!("orders[{}].symbol", index),
                "a non-empty string",
                format!("{:?}", order),
            ));
        }
        if !order.size.is_finite() {
            return Err(EngineError::argument(
                format!("orders[{}].size", index),
                "a finite number",
                order.size,
            ));
        }
    }
    Ok(())
}
