use crate::engine::BarResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

//one csv row per bar
#[derive(Debug, Serialize)]
struct BarRow {
    date: DateTime<Utc>,
    cash: f64,
    cost: f64,
    positions_value: f64,
    equity: f64,
    open_lots: usize,
    closed_lots: usize,
    orders: usize,
}

//writes a per-bar summary as csv
pub fn write_bars_csv<W: Write>(results: &[BarResult], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    for result in results {
        writer.serialize(BarRow {
            date: result.date,
            cash: result.cash,
            cost: result.cost,
            positions_value: result.positions_value(),
            equity: result.equity(),
            open_lots: result.positions_on_close.len(),
            closed_lots: result.closed_positions.len(),
            orders: result.orders.len(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

pub fn save_bars_csv<P: AsRef<Path>>(results: &[BarResult], path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).context(format!("Failed to create {:?}", path))?;
    write_bars_csv(results, file)
}

//writes every bar result, including all lots, as pretty json
pub fn save_results_json<P: AsRef<Path>>(results: &[BarResult], path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).context(format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), results)?;
    Ok(())
}
