use crate::portfolio::position::OpeningSnapshot;

//current monetary value of a lot of `size` units at `price`/`exchange_rate`,
//measured against the economics frozen when the lot was opened
//
//the margin paid on open stays bound to the lot; on top of it come
//- the exchange rate change, applied to the margin only if the lot settles the
//  difference (futures) or to the full notional otherwise
//- the price change, converted at the current exchange rate
//point value changes after open are ignored
pub fn position_value(size: f64, price: f64, exchange_rate: f64, lineage: &OpeningSnapshot) -> f64 {
    let units = size.abs();

    let price_paid = lineage.margin * lineage.point_value * lineage.exchange_rate * units;
    let original_value = lineage.price * lineage.point_value * lineage.exchange_rate * units;

    let exchange_rate_factor = exchange_rate / lineage.exchange_rate;
    let exchange_rate_change = if lineage.settle_difference {
        price_paid * exchange_rate_factor - price_paid
    } else {
        original_value * exchange_rate_factor - original_value
    };

    //signed size: longs gain on rises, shorts on falls
    let price_change = (price - lineage.price) * lineage.point_value * exchange_rate * size;

    price_paid + exchange_rate_change + price_change
}

//value of the opening snapshot itself at a given size
//equals the margin paid, as neither price nor exchange rate moved
pub fn opening_value(size: f64, lineage: &OpeningSnapshot) -> f64 {
    position_value(size, lineage.price, lineage.exchange_rate, lineage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn lineage(
        price: f64,
        exchange_rate: f64,
        point_value: f64,
        margin: f64,
        settle_difference: bool,
    ) -> OpeningSnapshot {
        OpeningSnapshot {
            id: 0,
            symbol: "AAPL".to_string(),
            date: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            price,
            exchange_rate,
            point_value,
            margin,
            settle_difference,
            size: 5.0,
            value: 0.0,
            profit: 0.0,
        }
    }

    #[test]
    fn test_simple_long_gain() {
        let original = lineage(7.0, 1.0, 1.0, 7.0, false);
        assert_eq!(position_value(5.0, 8.0, 1.0, &original), 40.0);
    }

    #[test]
    fn test_short_loses_on_rise() {
        let original = lineage(7.0, 1.0, 1.0, 7.0, false);
        assert_eq!(position_value(-5.0, 8.0, 1.0, &original), 30.0);
    }

    #[test]
    fn test_exchange_rate_on_full_notional() {
        //price unchanged, fx 1 -> 2: notional 35 gains 35
        let original = lineage(7.0, 1.0, 1.0, 7.0, false);
        assert_eq!(position_value(5.0, 7.0, 2.0, &original), 70.0);
    }

    #[test]
    fn test_settle_difference_only_exposes_margin() {
        let original = lineage(7.0, 1.2, 1000.0, 1.5, true);
        let value = position_value(-5.0, 8.0, 1.4, &original);
        //paid 9000, fx change on margin 1500, price change -7000
        assert!((value - 3500.0).abs() < 1e-9);
    }

    #[test]
    fn test_margin_smaller_than_price() {
        //paid 2 * 10 = 20, +5 price change on 10 units
        let original = lineage(100.0, 1.0, 1.0, 2.0, false);
        assert_eq!(position_value(10.0, 100.5, 1.0, &original), 25.0);
    }

    #[test]
    fn test_opening_value_is_margin_paid() {
        let original = lineage(7.0, 1.2, 1000.0, 1.5, true);
        assert!((opening_value(-3.0, &original) - 5400.0).abs() < 1e-9);
    }
}
