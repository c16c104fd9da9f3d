use crate::data::bar::BarData;
use anyhow::Result;

//pull-based supplier of bars; the engine calls next_bar exactly once per bar boundary
//
//every call returns the records of all instruments for the next bar, or none once
//the source is exhausted. dates must not decrease from one call to the next
pub trait BarSource {
    fn next_bar(&mut self) -> Result<Option<Vec<BarData>>>;
}

impl<S: BarSource + ?Sized> BarSource for &mut S {
    fn next_bar(&mut self) -> Result<Option<Vec<BarData>>> {
        (**self).next_bar()
    }
}

impl<S: BarSource + ?Sized> BarSource for Box<S> {
    fn next_bar(&mut self) -> Result<Option<Vec<BarData>>> {
        (**self).next_bar()
    }
}

//serves bars from any iterator (eg a vec of bars already held in memory)
pub struct IterSource<I> {
    bars: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Vec<BarData>>,
{
    pub fn new<T>(bars: T) -> Self
    where
        T: IntoIterator<IntoIter = I, Item = Vec<BarData>>,
    {
        IterSource {
            bars: bars.into_iter(),
        }
    }
}

impl<I> BarSource for IterSource<I>
where
    I: Iterator<Item = Vec<BarData>>,
{
    fn next_bar(&mut self) -> Result<Option<Vec<BarData>>> {
        Ok(self.bars.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_iter_source_yields_then_exhausts() {
        let date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut source = IterSource::new(vec![vec![BarData::new("AAPL", date, 1.0, 2.0)]]);

        let first = source.next_bar().unwrap().unwrap();
        assert_eq!(first[0].symbol, "AAPL");
        assert!(source.next_bar().unwrap().is_none());
        assert!(source.next_bar().unwrap().is_none());
    }
}
