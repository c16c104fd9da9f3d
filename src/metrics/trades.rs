use crate::engine::BarResult;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

//a lot that was (partly) closed during the backtest; fragments closed on different
//bars are summed up under the lot's id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClosedTrade {
    pub id: u64,
    pub symbol: String,
    pub opened: DateTime<Utc>,
    //date of the last closed fragment
    pub closed: DateTime<Utc>,
    pub opening_size: f64,
    pub closed_size: f64,
    pub profit: f64,
}

//collects closed lots in the order they were first closed
pub fn closed_trades(results: &[BarResult]) -> Vec<ClosedTrade> {
    let mut trades: IndexMap<u64, ClosedTrade> = IndexMap::new();

    for position in results.iter().flat_map(|result| result.closed_positions.iter()) {
        let trade = trades.entry(position.id).or_insert_with(|| ClosedTrade {
            id: position.id,
            symbol: position.symbol.clone(),
            opened: position.initial_position.date,
            closed: position.date,
            opening_size: position.initial_position.size,
            closed_size: 0.0,
            profit: 0.0,
        });
        trade.closed = position.date;
        trade.closed_size += position.size;
        trade.profit += position.profit;
    }

    trades.into_values().collect()
}
