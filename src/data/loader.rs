use crate::data::bar::BarData;
use crate::data::source::BarSource;
use crate::instrument::ContractBook;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    date: String,
    symbol: String,
    open: f64,
    close: f64,
    #[serde(default)]
    open_exchange_rate: Option<f64>,
    #[serde(default)]
    close_exchange_rate: Option<f64>,
    #[serde(default)]
    point_value: Option<f64>,
    #[serde(default)]
    margin: Option<f64>,
    #[serde(default)]
    settle_difference: Option<bool>,
}

//accepts rfc3339 timestamps or plain yyyy-mm-dd dates (midnight utc)
fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .context(format!("Failed to parse date '{}'", raw))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context(format!("Invalid date '{}'", raw))?;
    Ok(midnight.and_utc())
}

//loads per-symbol rows from a csv file, in chronological order
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<BarData>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut rows = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        let date = parse_date(&record.date).context(format!("Invalid date at line {}", index + 2))?;

        rows.push(BarData {
            symbol: record.symbol,
            date,
            open: record.open,
            close: record.close,
            open_exchange_rate: record.open_exchange_rate,
            close_exchange_rate: record.close_exchange_rate,
            point_value: record.point_value,
            margin: record.margin,
            settle_difference: record.settle_difference,
        });
    }

    //stable sort keeps the file order of symbols within one date
    rows.sort_by(|a, b| a.date.cmp(&b.date));

    Ok(rows)
}

//groups rows sharing a date into one bar each, oldest bar first
pub fn group_by_date(rows: Vec<BarData>) -> Vec<Vec<BarData>> {
    let mut grouped: IndexMap<DateTime<Utc>, Vec<BarData>> = IndexMap::new();
    for row in rows {
        grouped.entry(row.date).or_default().push(row);
    }
    grouped.into_values().collect()
}

//bar source backed by a csv file that is read up front
pub struct CsvBarSource {
    bars: VecDeque<Vec<BarData>>,
}

impl CsvBarSource {
    pub fn from_path<P: AsRef<Path>>(path: P, contracts: &ContractBook) -> Result<Self> {
        let mut rows = load_csv(path)?;
        for row in rows.iter_mut() {
            contracts.apply(row);
        }
        Ok(CsvBarSource {
            bars: group_by_date(rows).into(),
        })
    }

    //number of bars not yet served
    pub fn remaining(&self) -> usize {
        self.bars.len()
    }

    //the bars not yet served, oldest first
    pub fn into_bars(self) -> Vec<Vec<BarData>> {
        self.bars.into()
    }
}

impl BarSource for CsvBarSource {
    fn next_bar(&mut self) -> Result<Option<Vec<BarData>>> {
        Ok(self.bars.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::ContractSpec;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_sorts_and_parses_optional_columns() {
        let file = write_csv(
            "date,symbol,open,close,open_exchange_rate,close_exchange_rate,point_value,margin,settle_difference\n\
             2020-01-02,AAPL,11,12,,,,,\n\
             2020-01-01,AAPL,10,11,1.1,1.2,50,2,true\n",
        );

        let rows = load_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(rows[0].open_exchange_rate, Some(1.1));
        assert_eq!(rows[0].point_value, Some(50.0));
        assert_eq!(rows[0].settle_difference, Some(true));
        assert_eq!(rows[1].margin, None);
        assert_eq!(rows[1].settle_difference, None);
    }

    #[test]
    fn test_load_csv_without_optional_columns() {
        let file = write_csv("date,symbol,open,close\n2020-01-01T10:00:00Z,ES,100,101\n");
        let rows = load_csv(file.path()).unwrap();
        assert_eq!(rows[0].date, Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap());
        assert_eq!(rows[0].point_value, None);
    }

    #[test]
    fn test_load_csv_reports_bad_date() {
        let file = write_csv("date,symbol,open,close\nyesterday,ES,100,101\n");
        let err = load_csv(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_group_by_date_keeps_symbol_order() {
        let first = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        let rows = vec![
            BarData::new("AAPL", first, 1.0, 1.0),
            BarData::new("AMZN", first, 2.0, 2.0),
            BarData::new("AAPL", second, 1.0, 1.0),
        ];

        let bars = group_by_date(rows);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].len(), 2);
        assert_eq!(bars[0][0].symbol, "AAPL");
        assert_eq!(bars[0][1].symbol, "AMZN");
        assert_eq!(bars[1].len(), 1);
    }

    #[test]
    fn test_csv_source_applies_contracts() {
        let file = write_csv("date,symbol,open,close\n2020-01-01,ES,100,101\n2020-01-02,ES,101,102\n");
        let contracts = ContractBook::new(vec![ContractSpec::futures("ES", 50.0, 10.0)]);

        let mut source = CsvBarSource::from_path(file.path(), &contracts).unwrap();
        assert_eq!(source.remaining(), 2);

        let bar = source.next_bar().unwrap().unwrap();
        assert_eq!(bar[0].point_value, Some(50.0));
        assert_eq!(bar[0].margin, Some(10.0));
        assert_eq!(bar[0].settle_difference, Some(true));
        assert_eq!(source.remaining(), 1);

        let rest = source.into_bars();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0][0].close, 102.0);
    }
}
