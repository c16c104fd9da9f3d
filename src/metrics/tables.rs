use crate::engine::Order;
use crate::portfolio::Position;
use prettytable::{Cell, Row, Table};

//renders lots as a table, one row per lot
pub fn positions_table(positions: &[Position]) -> Table {
    let mut table = Table::new();

    table.add_row(Row::new(
        [
            "Id", "Symbol", "Type", "Size", "Bars", "Price", "FX", "Value", "Profit", "Opened",
        ]
        .iter()
        .map(|title| Cell::new(title))
        .collect(),
    ));

    for position in positions {
        table.add_row(Row::new(vec![
            Cell::new(&position.id.to_string()),
            Cell::new(&position.symbol),
            Cell::new(&position.price_type.to_string()),
            Cell::new(&format!("{}", position.size)),
            Cell::new(&position.bars_held.to_string()),
            Cell::new(&format!("{:.4}", position.price)),
            Cell::new(&format!("{:.4}", position.exchange_rate)),
            Cell::new(&format!("{:.2}", position.value)),
            Cell::new(&format!("{:.2}", position.profit)),
            Cell::new(&position.initial_position.date.format("%Y-%m-%d").to_string()),
        ]));
    }

    table
}

//renders orders as a symbol/size table
pub fn orders_table(orders: &[Order]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Symbol"), Cell::new("Size")]));
    for order in orders {
        table.add_row(Row::new(vec![
            Cell::new(&order.symbol),
            Cell::new(&format!("{}", order.size)),
        ]));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PriceType, ResolvedBarDatum};
    use crate::portfolio::PositionSpec;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_positions_table_has_header_and_rows() {
        let position = Position::create(PositionSpec::New {
            data: ResolvedBarDatum::new(
                "AAPL",
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
                7.0,
            ),
            size: 5.0,
            price_type: PriceType::Open,
            id: 0,
        })
        .unwrap();

        let table = positions_table(&[position]);
        assert_eq!(table.len(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("AAPL"));
        assert!(rendered.contains("35.00"));
    }

    #[test]
    fn test_orders_table() {
        let table = orders_table(&[Order::new("ES", -2.0)]);
        assert_eq!(table.len(), 2);
        assert!(table.to_string().contains("-2"));
    }
}
