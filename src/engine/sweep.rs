use crate::data::{BarData, IterSource};
use crate::engine::backtest::{BacktestConfig, BacktestEngine};
use crate::error::EngineResult;
use crate::metrics::SummaryMetrics;
use crate::strategy::Strategy;
use log::info;
use serde::{Deserialize, Serialize};

//outcome of one backtest of a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRun<P> {
    pub parameters: P,
    pub summary: SummaryMetrics,
}

//backtests every parameter set over the same bars, one run after the other
//
//each run gets its own engine (and so its own cash, lots and ids) and a fresh strategy
//from `build`; the first failing run aborts the sweep
pub fn run_sweep<P, S, F>(
    bars: &[Vec<BarData>],
    config: &BacktestConfig,
    parameters: Vec<P>,
    mut build: F,
) -> EngineResult<Vec<SweepRun<P>>>
where
    F: FnMut(&P) -> S,
    S: Strategy,
{
    let total = parameters.len();
    let mut runs = Vec::with_capacity(total);

    for (index, parameters) in parameters.into_iter().enumerate() {
        let mut strategy = build(&parameters);
        let mut source = IterSource::new(bars.to_vec());
        let results = BacktestEngine::new(config.clone())?.run(&mut source, &mut strategy)?;

        let summary = SummaryMetrics::from_results(&results, config.initial_cash);
        info!(
            "Sweep run {}/{} finished with equity {:.2}",
            index + 1,
            total,
            summary.final_equity
        );
        runs.push(SweepRun {
            parameters,
            summary,
        });
    }

    Ok(runs)
}

//runs ordered by final equity, best first; ties keep sweep order
pub fn rank_by_equity<P>(runs: &mut [SweepRun<P>]) {
    runs.sort_by(|a, b| b.summary.final_equity.total_cmp(&a.summary.final_equity));
}
