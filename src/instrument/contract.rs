use crate::data::BarData;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

//how the margin committed per unit is derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum MarginSpec {
    //fixed amount in price units
    Absolute(f64),
    //fraction of the bar's open price (eg 0.3 for 30%)
    Ratio(f64),
}

impl MarginSpec {
    pub fn margin_for(&self, open: f64) -> f64 {
        match self {
            MarginSpec::Absolute(margin) => *margin,
            MarginSpec::Ratio(ratio) => open * ratio,
        }
    }
}

//instrument economics that bar records may not carry themselves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSpec {
    //symbol as it appears in the bar data (eg es, nq)
    pub symbol: String,

    //monetary value of one full point move
    #[serde(default)]
    pub point_value: Option<f64>,

    //margin per unit; defaults to the open price when absent
    #[serde(default)]
    pub margin: Option<MarginSpec>,

    //true if p&l settles on margin only, as with futures
    #[serde(default)]
    pub settle_difference: Option<bool>,
}

impl ContractSpec {
    //a cash instrument: full notional paid, point value 1
    pub fn cash(symbol: impl Into<String>) -> Self {
        ContractSpec {
            symbol: symbol.into(),
            point_value: None,
            margin: None,
            settle_difference: None,
        }
    }

    //a futures contract with a fixed margin per contract (in price points)
    pub fn futures(symbol: impl Into<String>, point_value: f64, margin_points: f64) -> Self {
        ContractSpec {
            symbol: symbol.into(),
            point_value: Some(point_value),
            margin: Some(MarginSpec::Absolute(margin_points)),
            settle_difference: Some(true),
        }
    }

    //e-mini s&p 500: $50 per point, roughly $13000 initial margin
    pub fn es() -> Self {
        ContractSpec::futures("ES", 50.0, 260.0)
    }

    //e-mini nasdaq-100: $20 per point, roughly $17000 initial margin
    pub fn nq() -> Self {
        ContractSpec::futures("NQ", 20.0, 850.0)
    }

    //fills the fields the record leaves empty; values present on the record win
    pub fn apply(&self, bar: &mut BarData) {
        if bar.point_value.is_none() {
            bar.point_value = self.point_value;
        }
        if bar.margin.is_none() {
            bar.margin = self.margin.map(|margin| margin.margin_for(bar.open));
        }
        if bar.settle_difference.is_none() {
            bar.settle_difference = self.settle_difference;
        }
    }
}

//contract specifications by symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractBook {
    contracts: IndexMap<String, ContractSpec>,
}

impl ContractBook {
    pub fn new(contracts: Vec<ContractSpec>) -> Self {
        ContractBook {
            contracts: contracts
                .into_iter()
                .map(|contract| (contract.symbol.clone(), contract))
                .collect(),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&ContractSpec> {
        self.contracts.get(symbol)
    }

    pub fn insert(&mut self, contract: ContractSpec) {
        self.contracts.insert(contract.symbol.clone(), contract);
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    //applies the matching contract to a record; records of unknown symbols stay as they are
    pub fn apply(&self, bar: &mut BarData) {
        if let Some(contract) = self.get(&bar.symbol) {
            contract.apply(bar);
        }
    }
}
