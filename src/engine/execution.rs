use crate::data::{PriceType, ResolvedBarDatum};
use crate::engine::ids::IdAllocator;
use crate::engine::orders::{merge_orders, Order};
use crate::error::EngineResult;
use crate::portfolio::{Position, PositionSpec};
use log::trace;
use serde::{Deserialize, Serialize};

//split of an order into exposure that is closed and exposure that is opened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionChanges {
    //carries the sign of the exposure being removed (or 0)
    pub size_to_close: f64,
    //carries the sign of the new exposure (or 0)
    pub size_to_open: f64,
}

//sign as -1, 0 or 1; unlike f64::signum, zero has no direction
fn direction(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

//decides how much of an order closes existing exposure and how much opens new exposure
pub fn position_changes(current_size: f64, order_size: f64) -> PositionChanges {
    let same_direction = direction(order_size) == direction(current_size);
    //the aggregate flips from long to short (or back), or goes flat
    let will_switch = direction(current_size + order_size) != direction(current_size);

    let size_to_open = if same_direction {
        order_size
    } else if will_switch {
        current_size + order_size
    } else {
        0.0
    };

    let size_to_close = if will_switch {
        current_size
    } else if !same_direction {
        -order_size
    } else {
        0.0
    };

    PositionChanges {
        size_to_close,
        size_to_open,
    }
}

//outcome of applying one bar's orders to the held lots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub current_positions: Vec<Position>,
    pub closed_positions: Vec<Position>,
    pub orders_executed: Vec<Order>,
    pub orders_not_executed: Vec<Order>,
}

//applies orders to the held lots at the bar's open
//
//orders are merged per symbol first. a lot is never enlarged: new exposure always
//becomes a new lot, and existing lots are reduced oldest first. a partially closed
//lot shows up twice, as survivor in current_positions and as closed fragment in
//closed_positions, both sharing the same lineage
//
//lots of symbols without an order are passed through as they are; repricing them
//is left to update_prices
pub fn execute_orders(
    orders: &[Order],
    positions: &[Position],
    resolved: &[ResolvedBarDatum],
    ids: &mut IdAllocator,
) -> EngineResult<Execution> {
    let merged = merge_orders(orders);

    let mut execution = Execution {
        current_positions: positions
            .iter()
            .filter(|position| !merged.iter().any(|order| order.symbol == position.symbol))
            .cloned()
            .collect(),
        ..Execution::default()
    };

    for order in merged {
        let existing: Vec<&Position> = positions
            .iter()
            .filter(|position| position.symbol == order.symbol)
            .collect();

        let data = match resolved.iter().find(|data| data.symbol == order.symbol) {
            Some(data) if order.size != 0.0 => data,
            _ => {
                trace!("order {} {} not executed", order.symbol, order.size);
                execution
                    .current_positions
                    .extend(existing.into_iter().cloned());
                execution.orders_not_executed.push(order);
                continue;
            }
        };

        let current_size = existing.iter().fold(0.0, |sum, position| sum + position.size);
        let changes = position_changes(current_size, order.size);
        trace!(
            "order {} {}: held {}, closing {}, opening {}",
            order.symbol,
            order.size,
            current_size,
            changes.size_to_close,
            changes.size_to_open
        );

        //fifo: oldest lots first; sort_by is stable so equal ages keep their order
        let mut oldest_first = existing;
        oldest_first.sort_by(|a, b| b.bars_held.cmp(&a.bars_held));

        let mut to_close = changes.size_to_close.abs();
        for position in oldest_first {
            let held = position.size.abs();
            let sign = position.size.signum();
            let close_now = held.min(to_close);
            let keep = (held - close_now).max(0.0);

            if keep > 0.0 {
                execution.current_positions.push(position.reprice(
                    data,
                    keep * sign,
                    PriceType::Open,
                    position.bars_held,
                )?);
            }

            if close_now > 0.0 {
                execution.closed_positions.push(position.reprice(
                    data,
                    close_now * sign,
                    PriceType::Open,
                    position.bars_held,
                )?);
            }

            to_close -= close_now;
        }

        if changes.size_to_open != 0.0 {
            execution.current_positions.push(Position::create(PositionSpec::New {
                data: data.clone(),
                size: changes.size_to_open,
                price_type: PriceType::Open,
                id: ids.next_id(),
            })?);
        }

        execution.orders_executed.push(order);
    }

    Ok(execution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn datum(symbol: &str, day: u32, price: f64) -> ResolvedBarDatum {
        ResolvedBarDatum::new(symbol, Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap(), price)
    }

    fn lot(symbol: &str, size: f64, id: u64, bars_held: u32) -> Position {
        let opened = Position::create(PositionSpec::New {
            data: datum(symbol, 1, 10.0),
            size,
            price_type: PriceType::Open,
            id,
        })
        .unwrap();
        opened
            .reprice(&datum(symbol, 1, 10.0), size, PriceType::Close, bars_held)
            .unwrap()
    }

    fn bar() -> Vec<ResolvedBarDatum> {
        vec![datum("AAPL", 2, 12.0), datum("AMZN", 2, 20.0)]
    }

    #[test]
    fn test_changes_same_direction() {
        let changes = position_changes(5.0, 3.0);
        assert_eq!(changes.size_to_open, 3.0);
        assert_eq!(changes.size_to_close, 0.0);

        let changes = position_changes(0.0, -2.0);
        assert_eq!(changes.size_to_open, -2.0);
        assert_eq!(changes.size_to_close, 0.0);
    }

    #[test]
    fn test_changes_partial_close() {
        let changes = position_changes(5.0, -3.0);
        assert_eq!(changes.size_to_close, 3.0);
        assert_eq!(changes.size_to_open, 0.0);

        let changes = position_changes(-5.0, 2.0);
        assert_eq!(changes.size_to_close, -2.0);
        assert_eq!(changes.size_to_open, 0.0);
    }

    #[test]
    fn test_changes_full_close() {
        let changes = position_changes(5.0, -5.0);
        assert_eq!(changes.size_to_close, 5.0);
        assert_eq!(changes.size_to_open, 0.0);
    }

    #[test]
    fn test_changes_reversal() {
        let changes = position_changes(5.0, -8.0);
        assert_eq!(changes.size_to_close, 5.0);
        assert_eq!(changes.size_to_open, -3.0);

        let changes = position_changes(-2.0, 6.0);
        assert_eq!(changes.size_to_close, -2.0);
        assert_eq!(changes.size_to_open, 4.0);
    }

    #[test]
    fn test_missing_data_leaves_order_unexecuted() {
        let orders = vec![Order::new("MSFT", 3.0)];
        let positions = vec![lot("MSFT", 2.0, 0, 1)];
        let mut ids = IdAllocator::new();

        let execution = execute_orders(&orders, &positions, &bar(), &mut ids).unwrap();
        assert_eq!(execution.orders_not_executed, orders);
        assert!(execution.orders_executed.is_empty());
        assert_eq!(execution.current_positions, positions);
        assert!(execution.closed_positions.is_empty());
        assert_eq!(ids.issued(), 0);
    }

    #[test]
    fn test_net_zero_order_is_not_executed() {
        let orders = vec![Order::new("AAPL", 2.0), Order::new("AAPL", -2.0)];
        let positions = vec![lot("AAPL", 2.0, 0, 0)];
        let mut ids = IdAllocator::new();

        let execution = execute_orders(&orders, &positions, &bar(), &mut ids).unwrap();
        assert_eq!(execution.orders_not_executed, vec![Order::new("AAPL", 0.0)]);
        assert_eq!(execution.current_positions, positions);
    }

    #[test]
    fn test_opens_new_positions() {
        let orders = vec![Order::new("AAPL", 3.0), Order::new("AMZN", -2.0)];
        let mut ids = IdAllocator::new();

        let execution = execute_orders(&orders, &[], &bar(), &mut ids).unwrap();
        assert_eq!(execution.orders_executed, orders);
        assert_eq!(execution.current_positions.len(), 2);

        let aapl = &execution.current_positions[0];
        assert_eq!((aapl.id, aapl.size, aapl.price), (0, 3.0, 12.0));
        assert_eq!(aapl.price_type, PriceType::Open);
        let amzn = &execution.current_positions[1];
        assert_eq!((amzn.id, amzn.size, amzn.price), (1, -2.0, 20.0));
    }

    #[test]
    fn test_enlarging_adds_a_new_lot() {
        let positions = vec![lot("AAPL", 2.0, 0, 1)];
        let mut ids = IdAllocator::new();
        ids.next_id();

        let execution =
            execute_orders(&[Order::new("AAPL", 3.0)], &positions, &bar(), &mut ids).unwrap();
        assert_eq!(execution.current_positions.len(), 2);
        assert_eq!(execution.current_positions[0].id, 0);
        assert_eq!(execution.current_positions[0].size, 2.0);
        //existing lot is repriced at the open
        assert_eq!(execution.current_positions[0].price, 12.0);
        assert_eq!(execution.current_positions[1].id, 1);
        assert_eq!(execution.current_positions[1].size, 3.0);
        assert!(execution.closed_positions.is_empty());
    }

    #[test]
    fn test_untouched_symbols_pass_through() {
        let positions = vec![lot("AMZN", -4.0, 0, 2), lot("AAPL", 2.0, 1, 0)];
        let mut ids = IdAllocator::new();

        let execution =
            execute_orders(&[Order::new("AAPL", 1.0)], &positions, &bar(), &mut ids).unwrap();
        //amzn keeps its previous price
        assert_eq!(execution.current_positions[0], positions[0]);
        assert_eq!(execution.current_positions[0].price, 10.0);
    }

    #[test]
    fn test_closes_oldest_lots_first() {
        let positions = vec![
            lot("AAPL", 1.0, 0, 0),
            lot("AAPL", 1.0, 1, 1),
            lot("AAPL", 1.0, 2, 2),
        ];
        let mut ids = IdAllocator::new();

        let execution =
            execute_orders(&[Order::new("AAPL", -2.0)], &positions, &bar(), &mut ids).unwrap();

        let closed: Vec<(u64, u32)> = execution
            .closed_positions
            .iter()
            .map(|p| (p.id, p.bars_held))
            .collect();
        assert_eq!(closed, vec![(2, 2), (1, 1)]);
        assert_eq!(execution.current_positions.len(), 1);
        assert_eq!(execution.current_positions[0].id, 0);
        assert_eq!(execution.current_positions[0].size, 1.0);
    }

    #[test]
    fn test_equal_age_closes_in_existing_order() {
        let positions = vec![lot("AAPL", 1.0, 0, 1), lot("AAPL", 1.0, 1, 1)];
        let mut ids = IdAllocator::new();

        let execution =
            execute_orders(&[Order::new("AAPL", -1.0)], &positions, &bar(), &mut ids).unwrap();
        assert_eq!(execution.closed_positions[0].id, 0);
        assert_eq!(execution.current_positions[0].id, 1);
    }

    #[test]
    fn test_partial_close_keeps_id_and_lineage() {
        let positions = vec![lot("AAPL", 4.0, 0, 3)];
        let mut ids = IdAllocator::new();

        let execution =
            execute_orders(&[Order::new("AAPL", -1.5)], &positions, &bar(), &mut ids).unwrap();

        let survivor = &execution.current_positions[0];
        let closed = &execution.closed_positions[0];
        assert_eq!((survivor.id, survivor.size, survivor.bars_held), (0, 2.5, 3));
        assert_eq!((closed.id, closed.size, closed.bars_held), (0, 1.5, 3));
        assert_eq!(survivor.initial_position, positions[0].initial_position);
        assert_eq!(closed.initial_position, positions[0].initial_position);
        assert_eq!(closed.initial_position.size, 4.0);
        //no new lot was opened
        assert_eq!(ids.issued(), 0);
    }

    #[test]
    fn test_reversal_closes_all_and_opens_excess() {
        let positions = vec![lot("AAPL", 2.0, 0, 1), lot("AAPL", 3.0, 1, 0)];
        let mut ids = IdAllocator::new();
        ids.next_id();
        ids.next_id();

        let execution =
            execute_orders(&[Order::new("AAPL", -8.0)], &positions, &bar(), &mut ids).unwrap();

        assert_eq!(execution.closed_positions.len(), 2);
        assert!(execution.closed_positions.iter().all(|p| p.size > 0.0));
        assert_eq!(execution.current_positions.len(), 1);
        let reversed = &execution.current_positions[0];
        assert_eq!((reversed.id, reversed.size), (2, -3.0));
        assert_eq!(reversed.initial_position.size, -3.0);
    }

    #[test]
    fn test_short_partial_cover() {
        let positions = vec![lot("AMZN", -4.0, 0, 0)];
        let mut ids = IdAllocator::new();

        let execution =
            execute_orders(&[Order::new("AMZN", 1.0)], &positions, &bar(), &mut ids).unwrap();
        assert_eq!(execution.current_positions[0].size, -3.0);
        assert_eq!(execution.closed_positions[0].size, -1.0);
    }
}
