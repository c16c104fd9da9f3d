use crate::error::{ensure_finite, EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//which side of a bar a price belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Open,
    Close,
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceType::Open => write!(f, "open"),
            PriceType::Close => write!(f, "close"),
        }
    }
}

//one instrument's raw record for one bar, as delivered by a bar source
//optional fields are filled in by complement()
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarData {
    pub symbol: String,
    pub date: DateTime<Utc>,
    pub open: f64,
    pub close: f64,
    #[serde(default)]
    pub open_exchange_rate: Option<f64>,
    #[serde(default)]
    pub close_exchange_rate: Option<f64>,
    #[serde(default)]
    pub point_value: Option<f64>,
    //absolute margin per unit, in price units; relates to the open price
    #[serde(default)]
    pub margin: Option<f64>,
    #[serde(default)]
    pub settle_difference: Option<bool>,
}

impl BarData {
    //creates a record with every optional field left to its default
    pub fn new(symbol: impl Into<String>, date: DateTime<Utc>, open: f64, close: f64) -> Self {
        BarData {
            symbol: symbol.into(),
            date,
            open,
            close,
            open_exchange_rate: None,
            close_exchange_rate: None,
            point_value: None,
            margin: None,
            settle_difference: None,
        }
    }

    pub fn with_exchange_rates(mut self, open: f64, close: f64) -> Self {
        self.open_exchange_rate = Some(open);
        self.close_exchange_rate = Some(close);
        self
    }

    pub fn with_point_value(mut self, point_value: f64) -> Self {
        self.point_value = Some(point_value);
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn with_settle_difference(mut self, settle_difference: bool) -> Self {
        self.settle_difference = Some(settle_difference);
        self
    }

    //checks the record before it enters the engine
    pub fn validate(&self) -> EngineResult<()> {
        if self.symbol.is_empty() {
            return Err(EngineError::argument(
                "bar.symbol",
                "a non-empty string",
                format!("\"{}\"", self.symbol),
            ));
        }
        ensure_finite("bar.open", self.open)?;
        ensure_finite("bar.close", self.close)?;

        let optional = [
            ("bar.openExchangeRate", self.open_exchange_rate),
            ("bar.closeExchangeRate", self.close_exchange_rate),
            ("bar.pointValue", self.point_value),
            ("bar.margin", self.margin),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                ensure_finite(name, value)?;
            }
        }
        Ok(())
    }

    //fills missing fields with their defaults
    //exchange rates and point value default to 1, margin to the open price
    pub fn complement(&self) -> BarData {
        BarData {
            symbol: self.symbol.clone(),
            date: self.date,
            open: self.open,
            close: self.close,
            open_exchange_rate: Some(self.open_exchange_rate.unwrap_or(1.0)),
            close_exchange_rate: Some(self.close_exchange_rate.unwrap_or(1.0)),
            point_value: Some(self.point_value.unwrap_or(1.0)),
            margin: Some(self.margin.unwrap_or(self.open)),
            settle_difference: Some(self.settle_difference.unwrap_or(false)),
        }
    }

    //picks the open or close economics of this record
    pub fn resolve(&self, price_type: PriceType) -> ResolvedBarDatum {
        let (price, exchange_rate) = match price_type {
            PriceType::Open => (self.open, self.open_exchange_rate),
            PriceType::Close => (self.close, self.close_exchange_rate),
        };

        ResolvedBarDatum {
            symbol: self.symbol.clone(),
            date: self.date,
            price,
            exchange_rate: exchange_rate.unwrap_or(1.0),
            point_value: self.point_value.unwrap_or(1.0),
            margin: self.margin.unwrap_or(self.open),
            settle_difference: self.settle_difference.unwrap_or(false),
        }
    }
}

//one instrument's economics on one side of one bar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedBarDatum {
    pub symbol: String,
    pub date: DateTime<Utc>,
    pub price: f64,
    pub exchange_rate: f64,
    pub point_value: f64,
    pub margin: f64,
    pub settle_difference: bool,
}

impl ResolvedBarDatum {
    //creates a datum with margin = price and every other field at its default
    pub fn new(symbol: impl Into<String>, date: DateTime<Utc>, price: f64) -> Self {
        ResolvedBarDatum {
            symbol: symbol.into(),
            date,
            price,
            exchange_rate: 1.0,
            point_value: 1.0,
            margin: price,
            settle_difference: false,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.symbol.is_empty() {
            return Err(EngineError::argument(
                "resolvedData.symbol",
                "a non-empty string",
                format!("\"{}\"", self.symbol),
            ));
        }
        ensure_finite("resolvedData.price", self.price)?;
        ensure_finite("resolvedData.exchangeRate", self.exchange_rate)?;
        ensure_finite("resolvedData.pointValue", self.point_value)?;
        ensure_finite("resolvedData.margin", self.margin)?;
        Ok(())
    }
}

//resolves a whole bar for one side
pub fn resolve_bar(bar: &[BarData], price_type: PriceType) -> Vec<ResolvedBarDatum> {
    bar.iter().map(|data| data.resolve(price_type)).collect()
}
