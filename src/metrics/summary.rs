use crate::engine::BarResult;
use crate::metrics::timeseries::{cagr, calculate_equity_curve, calculate_returns, max_drawdown};
use crate::metrics::trades::{closed_trades, ClosedTrade};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a backtest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub initial_cash: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub cagr: f64,
    pub max_absolute_drawdown: f64,
    pub max_relative_drawdown: f64,
    pub sharpe_ratio: f64,
    pub num_bars: usize,
    pub num_trades: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub win_rate: f64,
    pub average_profit: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub profit_factor: f64,
    pub exposure: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from the per-bar results of a backtest
    pub fn from_results(results: &[BarResult], initial_cash: f64) -> Self {
        let curve = calculate_equity_curve(results);
        let equity: Vec<f64> = curve.iter().map(|point| point.equity).collect();

        let final_equity = equity.last().copied().unwrap_or(initial_cash);
        let total_return = final_equity - initial_cash;
        let total_return_pct = if initial_cash != 0.0 {
            total_return / initial_cash
        } else {
            0.0
        };

        let cagr = match (curve.first(), curve.last()) {
            (Some(first), Some(last)) => cagr((first.date, first.equity), (last.date, last.equity)),
            _ => 0.0,
        };

        let returns = calculate_returns(&equity);
        let sharpe_ratio = calculate_sharpe_ratio(&returns);

        let trades = closed_trades(results);
        let trade_stats = calculate_trade_statistics(&trades);

        let bars_in_market = results
            .iter()
            .filter(|result| !result.positions_on_close.is_empty())
            .count();
        let exposure = if results.is_empty() {
            0.0
        } else {
            bars_in_market as f64 / results.len() as f64
        };

        SummaryMetrics {
            initial_cash,
            final_equity,
            total_return,
            total_return_pct,
            cagr,
            max_absolute_drawdown: max_drawdown(&equity, false),
            max_relative_drawdown: max_drawdown(&equity, true),
            sharpe_ratio,
            num_bars: results.len(),
            num_trades: trades.len(),
            num_winning_trades: trade_stats.num_winning_trades,
            num_losing_trades: trade_stats.num_losing_trades,
            win_rate: trade_stats.win_rate,
            average_profit: trade_stats.average_profit,
            largest_win: trade_stats.largest_win,
            largest_loss: trade_stats.largest_loss,
            profit_factor: trade_stats.profit_factor,
            exposure,
        }
    }

    //builds the metrics table
    pub fn to_table(&self) -> Table {
        let rows = [
            ("Initial Cash", format!("{:.2}", self.initial_cash)),
            ("Final Equity", format!("{:.2}", self.final_equity)),
            (
                "Total Return",
                format!(
                    "{:.2} ({:.2}%)",
                    self.total_return,
                    self.total_return_pct * 100.0
                ),
            ),
            ("CAGR", format!("{:.2}%", self.cagr * 100.0)),
            (
                "Max Drawdown",
                format!(
                    "{:.2} ({:.2}%)",
                    self.max_absolute_drawdown,
                    self.max_relative_drawdown * 100.0
                ),
            ),
            ("Sharpe Ratio", format!("{:.3}", self.sharpe_ratio)),
            ("Bars", format!("{}", self.num_bars)),
            ("Number of Trades", format!("{}", self.num_trades)),
            ("Win Rate", format!("{:.2}%", self.win_rate * 100.0)),
            ("Average Profit", format!("{:.2}", self.average_profit)),
            ("Largest Win", format!("{:.2}", self.largest_win)),
            ("Largest Loss", format!("{:.2}", self.largest_loss)),
            ("Profit Factor", format!("{:.3}", self.profit_factor)),
            ("Exposure", format!("{:.2}%", self.exposure * 100.0)),
        ];

        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));
        for (name, value) in rows.iter() {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(value)]));
        }
        table
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        self.to_table().printstd();
    }
}

struct TradeStats {
    num_winning_trades: usize,
    num_losing_trades: usize,
    win_rate: f64,
    average_profit: f64,
    profit_factor: f64,
    largest_win: f64,
    largest_loss: f64,
}

fn calculate_trade_statistics(trades: &[ClosedTrade]) -> TradeStats {
    let profits: Vec<f64> = trades.iter().map(|trade| trade.profit).collect();
    let wins: Vec<f64> = profits.iter().copied().filter(|&p| p > 0.0).collect();
    let losses: Vec<f64> = profits.iter().copied().filter(|&p| p < 0.0).collect();

    let total = profits.len();
    let win_rate = if total > 0 {
        wins.len() as f64 / total as f64
    } else {
        0.0
    };
    let average_profit = if total > 0 {
        profits.iter().sum::<f64>() / total as f64
    } else {
        0.0
    };

    let total_wins: f64 = wins.iter().sum();
    let total_losses: f64 = losses.iter().sum::<f64>().abs();
    let profit_factor = if total_losses > 0.0 {
        total_wins / total_losses
    } else if total_wins > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    TradeStats {
        num_winning_trades: wins.len(),
        num_losing_trades: losses.len(),
        win_rate,
        average_profit,
        profit_factor,
        largest_win: wins.iter().fold(0.0f64, |a, &b| a.max(b)),
        largest_loss: losses.iter().fold(0.0f64, |a, &b| a.min(b)),
    }
}

fn calculate_sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.mean();
    let std_dev = returns.std_dev();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return 0.0;
    }

    //annualize assuming daily bars
    (mean / std_dev) * (252.0_f64).sqrt()
}
