use crate::data::{PriceType, ResolvedBarDatum};
use crate::error::{ensure_finite, EngineError, EngineResult};
use crate::portfolio::valuation::{opening_value, position_value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//frozen economics of a lot, captured once when it was opened and never rewritten
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpeningSnapshot {
    pub id: u64,
    pub symbol: String,
    pub date: DateTime<Utc>,
    pub price: f64,
    pub exchange_rate: f64,
    pub point_value: f64,
    pub margin: f64,
    pub settle_difference: bool,
    //size on open; later fragments of the lot may be smaller
    pub size: f64,
    pub value: f64,
    pub profit: f64,
}

//one discrete holding of an instrument, tracked by a stable id from open to full close
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub id: u64,
    pub symbol: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub price_type: PriceType,

    //positive for long, negative for short
    pub size: f64,

    //number of open-price agings the lot survived
    pub bars_held: u32,

    pub price: f64,
    pub exchange_rate: f64,

    //margin, point value and settle difference always come from the opening snapshot
    pub point_value: f64,
    pub margin: f64,
    pub settle_difference: bool,

    pub value: f64,

    //value change caused by price and fx moves since open, at the current size
    pub profit: f64,

    pub initial_position: OpeningSnapshot,
}

//what the position factory is asked to build
#[derive(Debug, Clone)]
pub enum PositionSpec {
    //opens new exposure; the lot becomes its own opening snapshot
    New {
        data: ResolvedBarDatum,
        size: f64,
        price_type: PriceType,
        id: u64,
    },
    //reprices or resizes an existing lot, keeping its id and lineage
    Continued {
        data: ResolvedBarDatum,
        size: f64,
        price_type: PriceType,
        lineage: OpeningSnapshot,
        bars_held: u32,
    },
}

impl PositionSpec {
    //resolves the loose "either an id or a lineage" form into a spec
    pub fn from_parts(
        data: ResolvedBarDatum,
        size: f64,
        price_type: PriceType,
        bars_held: u32,
        id: Option<u64>,
        lineage: Option<OpeningSnapshot>,
    ) -> EngineResult<Self> {
        match (id, lineage) {
            (Some(id), None) => {
                if bars_held != 0 {
                    return Err(EngineError::invariant(format!(
                        "a new position (id {}) must start with barsHeld 0, got {}",
                        id, bars_held
                    )));
                }
                Ok(PositionSpec::New {
                    data,
                    size,
                    price_type,
                    id,
                })
            }
            (None, Some(lineage)) => Ok(PositionSpec::Continued {
                data,
                size,
                price_type,
                lineage,
                bars_held,
            }),
            (Some(id), Some(lineage)) => Err(EngineError::invariant(format!(
                "unexpected id {} as initialPosition (id {}) is set as well",
                id, lineage.id
            ))),
            (None, None) => Err(EngineError::invariant(
                "either pass an id or an initialPosition, got neither",
            )),
        }
    }
}

impl Position {
    //builds a validated lot, deriving its value and profit
    pub fn create(spec: PositionSpec) -> EngineResult<Self> {
        let (data, size, price_type, lineage, bars_held) = match spec {
            PositionSpec::New {
                data,
                size,
                price_type,
                id,
            } => {
                data.validate()?;
                ensure_finite("size", size)?;
                let mut lineage = OpeningSnapshot {
                    id,
                    symbol: data.symbol.clone(),
                    date: data.date,
                    price: data.price,
                    exchange_rate: data.exchange_rate,
                    point_value: data.point_value,
                    margin: data.margin,
                    settle_difference: data.settle_difference,
                    size,
                    value: 0.0,
                    profit: 0.0,
                };
                lineage.value = opening_value(size, &lineage);
                (data, size, price_type, lineage, 0)
            }
            PositionSpec::Continued {
                data,
                size,
                price_type,
                lineage,
                bars_held,
            } => {
                data.validate()?;
                ensure_finite("size", size)?;
                if lineage.symbol != data.symbol {
                    return Err(EngineError::argument(
                        "resolvedData.symbol",
                        format!("the lineage's symbol \"{}\"", lineage.symbol),
                        format!("\"{}\"", data.symbol),
                    ));
                }
                (data, size, price_type, lineage, bars_held)
            }
        };

        let value = position_value(size, data.price, data.exchange_rate, &lineage);
        //compare against the opening snapshot at the current size so that partial
        //closes do not show up as profit
        let profit = value - opening_value(size, &lineage);

        let position = Position {
            id: lineage.id,
            symbol: data.symbol,
            date: data.date,
            price_type,
            size,
            bars_held,
            price: data.price,
            exchange_rate: data.exchange_rate,
            point_value: lineage.point_value,
            margin: lineage.margin,
            settle_difference: lineage.settle_difference,
            value,
            profit,
            initial_position: lineage,
        };

        position.validate()?;
        Ok(position)
    }

    //rebuilds this lot from new bar data, keeping id and lineage
    pub fn reprice(
        &self,
        data: &ResolvedBarDatum,
        size: f64,
        price_type: PriceType,
        bars_held: u32,
    ) -> EngineResult<Position> {
        Position::create(PositionSpec::Continued {
            data: data.clone(),
            size,
            price_type,
            lineage: self.initial_position.clone(),
            bars_held,
        })
    }

    //checks a constructed record; a failure here is always fatal
    pub fn validate(&self) -> EngineResult<()> {
        if self.symbol.is_empty() {
            return Err(EngineError::argument(
                "position.symbol",
                "a non-empty string",
                "\"\"",
            ));
        }
        ensure_finite("position.size", self.size)?;
        ensure_finite("position.price", self.price)?;
        ensure_finite("position.exchangeRate", self.exchange_rate)?;
        ensure_finite("position.value", self.value)?;
        ensure_finite("position.profit", self.profit)?;
        if self.id != self.initial_position.id {
            return Err(EngineError::invariant(format!(
                "position id {} differs from its initialPosition's id {}",
                self.id, self.initial_position.id
            )));
        }
        Ok(())
    }

    pub fn is_long(&self) -> bool {
        self.size > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.size < 0.0
    }
}

//sum of the values of all lots; no lots are worth +0.0 (an empty f64 sum is -0.0)
pub fn total_value(positions: &[Position]) -> f64 {
    positions.iter().fold(0.0, |sum, position| sum + position.value)
}

//aggregate signed size of all lots of one symbol
pub fn net_size(positions: &[Position], symbol: &str) -> f64 {
    positions
        .iter()
        .filter(|position| position.symbol == symbol)
        .fold(0.0, |sum, position| sum + position.size)
}
