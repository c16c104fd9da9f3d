use crate::engine::BacktestConfig;
use crate::instrument::{ContractBook, ContractSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

//strategy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    SmaCrossover,
}

impl StrategyType {
    //parse strategy type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sma" | "sma_crossover" => Some(StrategyType::SmaCrossover),
            _ => None,
        }
    }
}

//sma crossover strategy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmaParams {
    pub fast_window: usize,
    pub slow_window: usize,
    //absolute size targeted on every signal
    pub size: f64,
    //symbols to trade; all symbols of the data if empty
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl Default for SmaParams {
    fn default() -> Self {
        SmaParams {
            fast_window: 20,
            slow_window: 50,
            size: 1.0,
            symbols: Vec::new(),
        }
    }
}

//complete backtest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfiguration {
    //data
    pub data_path: PathBuf,

    //instrument economics for symbols whose rows lack them
    #[serde(default)]
    pub contracts: Vec<ContractSpec>,

    //account settings
    pub initial_cash: f64,
    #[serde(default)]
    pub history_length: Option<usize>,

    //strategy
    pub strategy_type: StrategyType,
    #[serde(default)]
    pub strategy_params: SmaParams,

    //optional output paths
    #[serde(default)]
    pub output_bars_csv: Option<PathBuf>,
    #[serde(default)]
    pub output_results_json: Option<PathBuf>,
}

impl Default for BacktestConfiguration {
    fn default() -> Self {
        BacktestConfiguration {
            data_path: PathBuf::from("data.csv"),
            contracts: vec![ContractSpec::es(), ContractSpec::nq()],
            initial_cash: 100000.0,
            history_length: Some(500),
            strategy_type: StrategyType::SmaCrossover,
            strategy_params: SmaParams::default(),
            output_bars_csv: None,
            output_results_json: None,
        }
    }
}

impl BacktestConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BacktestConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    //engine settings
    pub fn engine_config(&self) -> BacktestConfig {
        BacktestConfig {
            initial_cash: self.initial_cash,
            history_length: self.history_length,
        }
    }

    pub fn contract_book(&self) -> ContractBook {
        ContractBook::new(self.contracts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_strategy_type() {
        assert_eq!(StrategyType::parse("SMA"), Some(StrategyType::SmaCrossover));
        assert_eq!(StrategyType::parse("rsi"), None);
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let file = NamedTempFile::new().unwrap();
        let config = BacktestConfiguration::default();
        config.to_json_file(file.path()).unwrap();

        let loaded = BacktestConfiguration::from_json_file(file.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.contract_book().len(), 2);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let config: BacktestConfiguration = serde_json::from_str(
            r#"{"data_path":"bars.csv","initial_cash":5000,"strategy_type":"sma_crossover"}"#,
        )
        .unwrap();
        assert!(config.contracts.is_empty());
        assert_eq!(config.history_length, None);
        assert_eq!(config.strategy_params, SmaParams::default());
        assert_eq!(config.engine_config().initial_cash, 5000.0);
    }
}
