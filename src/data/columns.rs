use crate::data::bar::BarData;
use indexmap::IndexMap;

//turns a bar history (newest bar first, one record per symbol and bar) into one
//chronological series per symbol
//only symbols present in the newest bar are returned; every series is cut after
//max_length records (counted from the newest) and dropped if shorter than min_length
pub fn to_columns<'a, I>(history: I, min_length: usize, max_length: Option<usize>) -> Vec<Vec<BarData>>
where
    I: IntoIterator<Item = &'a Vec<BarData>>,
{
    let mut bars = history.into_iter();
    let mut columns: IndexMap<String, Vec<BarData>> = IndexMap::new();

    let newest = match bars.next() {
        Some(newest) => newest,
        None => return Vec::new(),
    };
    for record in newest {
        columns.entry(record.symbol.clone()).or_default();
    }

    let limit = max_length.unwrap_or(usize::MAX);
    for bar in std::iter::once(newest).chain(bars) {
        for record in bar {
            if let Some(column) = columns.get_mut(&record.symbol) {
                if column.len() < limit {
                    column.push(record.clone());
                }
            }
        }
    }

    columns
        .into_values()
        .filter(|column| column.len() >= min_length)
        .map(|mut column| {
            column.reverse();
            column
        })
        .collect()
}

//close prices of one symbol, oldest first, from a newest-first history
pub fn close_prices<'a, I>(history: I, symbol: &str, max_length: usize) -> Vec<f64>
where
    I: IntoIterator<Item = &'a Vec<BarData>>,
{
    let mut closes: Vec<f64> = history
        .into_iter()
        .filter_map(|bar| bar.iter().find(|record| record.symbol == symbol))
        .take(max_length)
        .map(|record| record.close)
        .collect();
    closes.reverse();
    closes
}
