use crate::engine::BarResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.2425;

//a point in the equity curve
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub date: DateTime<Utc>,
    pub cash: f64,
    pub positions_value: f64,
    pub equity: f64,
    //relative drawdown from the running peak
    pub drawdown: f64,
    pub returns: f64,
}

//builds the equity curve (cash + close value of all lots) from per-bar results
pub fn calculate_equity_curve(results: &[BarResult]) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(results.len());
    let mut peak = f64::NEG_INFINITY;
    let mut prev_equity: Option<f64> = None;

    for result in results {
        let positions_value = result.positions_value();
        let equity = result.cash + positions_value;

        peak = peak.max(equity);
        let drawdown = if peak > 0.0 { 1.0 - equity / peak } else { 0.0 };

        let returns = match prev_equity {
            Some(prev) if prev != 0.0 => (equity - prev) / prev,
            _ => 0.0,
        };

        curve.push(EquityPoint {
            date: result.date,
            cash: result.cash,
            positions_value,
            equity,
            drawdown,
            returns,
        });
        prev_equity = Some(equity);
    }

    curve
}

//largest drop from a running high; relative drops are fractions of that high
pub fn max_drawdown(values: &[f64], relative: bool) -> f64 {
    let mut high = f64::NEG_INFINITY;
    let mut drawdown: f64 = 0.0;

    for &value in values {
        high = high.max(value);
        let current = if relative {
            1.0 - value / high
        } else {
            high - value
        };
        drawdown = drawdown.max(current);
    }

    drawdown
}

//compound annual growth rate between two dated values, in parts (0.1 for 10%)
pub fn cagr(first: (DateTime<Utc>, f64), last: (DateTime<Utc>, f64)) -> f64 {
    let seconds = (last.0 - first.0).num_seconds() as f64;
    let years = seconds / 60.0 / 60.0 / 24.0 / DAYS_PER_YEAR;

    if years > 0.0 && first.1 != 0.0 {
        (last.1 / first.1).powf(1.0 / years) - 1.0
    } else {
        0.0
    }
}

//calculates returns from equity values
pub fn calculate_returns(equity_values: &[f64]) -> Vec<f64> {
    equity_values
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}
