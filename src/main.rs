use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use std::path::PathBuf;
use walkforward::prelude::*;

#[derive(Parser)]
#[command(name = "walkforward")]
#[command(about = "A bar-driven backtesting engine for cash and margined instruments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a backtest
    Run {
        //json configuration file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        //path to csv data file
        #[arg(long)]
        data: Option<PathBuf>,

        //initial cash
        #[arg(long)]
        cash: Option<f64>,

        //number of bars handed to the strategy
        #[arg(long)]
        history_length: Option<usize>,

        //strategy type (sma)
        #[arg(long)]
        strategy: Option<String>,

        //fast sma window
        #[arg(long)]
        fast: Option<usize>,

        //slow sma window
        #[arg(long)]
        slow: Option<usize>,

        //absolute size targeted on every signal
        #[arg(long)]
        size: Option<f64>,

        //comma separated symbols to trade
        #[arg(long, value_delimiter = ',')]
        symbols: Option<Vec<String>>,

        //output path for the per-bar csv summary
        #[arg(long)]
        output_bars_csv: Option<PathBuf>,

        //output path for the full json results
        #[arg(long)]
        output_results_json: Option<PathBuf>,
    },
    //backtest the sma crossover over a grid of windows
    Sweep {
        //json configuration file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        //path to csv data file
        #[arg(long)]
        data: Option<PathBuf>,

        //initial cash
        #[arg(long)]
        cash: Option<f64>,

        //number of bars handed to the strategy
        #[arg(long)]
        history_length: Option<usize>,

        //comma separated fast sma windows
        #[arg(long, value_delimiter = ',', required = true)]
        fast: Vec<usize>,

        //comma separated slow sma windows; only those above the fast window are tried
        #[arg(long, value_delimiter = ',', required = true)]
        slow: Vec<usize>,

        //absolute size targeted on every signal
        #[arg(long)]
        size: Option<f64>,

        //comma separated symbols to trade
        #[arg(long, value_delimiter = ',')]
        symbols: Option<Vec<String>>,

        //number of best runs to print
        #[arg(long, default_value = "10")]
        top: usize,
    },
}

//flag values that override the configuration file
struct Overrides {
    data: Option<PathBuf>,
    cash: Option<f64>,
    history_length: Option<usize>,
    strategy: Option<String>,
    fast: Option<usize>,
    slow: Option<usize>,
    size: Option<f64>,
    symbols: Option<Vec<String>>,
    output_bars_csv: Option<PathBuf>,
    output_results_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            cash,
            history_length,
            strategy,
            fast,
            slow,
            size,
            symbols,
            output_bars_csv,
            output_results_json,
        } => {
            let overrides = Overrides {
                data,
                cash,
                history_length,
                strategy,
                fast,
                slow,
                size,
                symbols,
                output_bars_csv,
                output_results_json,
            };
            let configuration = build_configuration(config, overrides)?;
            run_backtest(configuration)?;
        }
        Commands::Sweep {
            config,
            data,
            cash,
            history_length,
            fast,
            slow,
            size,
            symbols,
            top,
        } => {
            let overrides = Overrides {
                data,
                cash,
                history_length,
                strategy: None,
                fast: None,
                slow: None,
                size,
                symbols,
                output_bars_csv: None,
                output_results_json: None,
            };
            let configuration = build_configuration(config, overrides)?;
            run_sma_sweep(configuration, fast, slow, top)?;
        }
    }

    Ok(())
}

fn build_configuration(path: Option<PathBuf>, overrides: Overrides) -> Result<BacktestConfiguration> {
    let mut configuration = match &path {
        Some(path) => BacktestConfiguration::from_json_file(path)
            .context(format!("Failed to load configuration from {:?}", path))?,
        None => {
            if overrides.data.is_none() {
                anyhow::bail!("Either --config or --data is required");
            }
            BacktestConfiguration::default()
        }
    };

    if let Some(data) = overrides.data {
        configuration.data_path = data;
    }
    if let Some(cash) = overrides.cash {
        configuration.initial_cash = cash;
    }
    if let Some(history_length) = overrides.history_length {
        configuration.history_length = Some(history_length);
    }
    if let Some(name) = overrides.strategy {
        configuration.strategy_type = StrategyType::parse(&name)
            .ok_or_else(|| anyhow::anyhow!("Unknown strategy: {}", name))?;
    }

    let params = &mut configuration.strategy_params;
    if let Some(fast) = overrides.fast {
        params.fast_window = fast;
    }
    if let Some(slow) = overrides.slow {
        params.slow_window = slow;
    }
    if let Some(size) = overrides.size {
        params.size = size;
    }
    if let Some(symbols) = overrides.symbols {
        params.symbols = symbols;
    }

    if overrides.output_bars_csv.is_some() {
        configuration.output_bars_csv = overrides.output_bars_csv;
    }
    if overrides.output_results_json.is_some() {
        configuration.output_results_json = overrides.output_results_json;
    }

    Ok(configuration)
}

fn run_backtest(configuration: BacktestConfiguration) -> Result<()> {
    println!("Walkforward Backtesting Engine");
    println!("==============================\n");

    //load data
    let data_path = &configuration.data_path;
    println!("Loading data from {:?}...", data_path);
    let contracts = configuration.contract_book();
    let mut source = CsvBarSource::from_path(data_path, &contracts)
        .context(format!("Failed to load data from {:?}", data_path))?;

    if source.remaining() == 0 {
        anyhow::bail!("No bars found in {:?}", data_path);
    }
    println!("Loaded {} bars", source.remaining());
    println!("Contracts configured: {}\n", contracts.len());

    //create strategy
    let mut strategy: Box<dyn Strategy> = match configuration.strategy_type {
        StrategyType::SmaCrossover => {
            let params = &configuration.strategy_params;
            if params.fast_window == 0 || params.fast_window >= params.slow_window {
                anyhow::bail!(
                    "Fast window ({}) must be positive and smaller than slow window ({})",
                    params.fast_window,
                    params.slow_window
                );
            }

            println!(
                "Strategy: SMA Crossover (fast={}, slow={}, size={})",
                params.fast_window, params.slow_window, params.size
            );
            Box::new(SmaCrossoverStrategy::new(
                params.symbols.clone(),
                params.fast_window,
                params.slow_window,
                params.size,
            ))
        }
    };

    println!("Initial cash: {:.2}\n", configuration.initial_cash);

    //run backtest
    println!("Running backtest...\n");
    let engine = BacktestEngine::new(configuration.engine_config())?;
    let results = engine.run(&mut source, &mut strategy)?;

    //display results
    println!("Backtest Results");
    println!("================\n");
    let summary = SummaryMetrics::from_results(&results, configuration.initial_cash);
    summary.pretty_print_table();

    //save outputs if requested
    if let Some(path) = &configuration.output_bars_csv {
        save_bars_csv(&results, path)?;
        println!("\nBar summary saved to {:?}", path);
    }

    if let Some(path) = &configuration.output_results_json {
        save_results_json(&results, path)?;
        println!("Results saved to {:?}", path);
    }

    Ok(())
}

fn run_sma_sweep(
    configuration: BacktestConfiguration,
    fast: Vec<usize>,
    slow: Vec<usize>,
    top: usize,
) -> Result<()> {
    println!("Walkforward Parameter Sweep");
    println!("===========================\n");

    let data_path = &configuration.data_path;
    println!("Loading data from {:?}...", data_path);
    let bars = CsvBarSource::from_path(data_path, &configuration.contract_book())
        .context(format!("Failed to load data from {:?}", data_path))?
        .into_bars();
    if bars.is_empty() {
        anyhow::bail!("No bars found in {:?}", data_path);
    }
    println!("Loaded {} bars", bars.len());

    //[fast, slow] with fast >= 1 and slow above fast
    let grid = ParameterGrid::new()
        .stage(move |_previous: &[usize]| fast.iter().copied().filter(|&f| f > 0).collect())
        .stage(move |previous: &[usize]| {
            slow.iter().copied().filter(|&s| s > previous[0]).collect()
        });
    let combinations = grid.generate();
    if combinations.is_empty() {
        anyhow::bail!("No window pair with a slow window above the fast window");
    }
    println!("Running {} parameter sets...\n", combinations.len());

    let params = &configuration.strategy_params;
    let mut runs = run_sweep(
        &bars,
        &configuration.engine_config(),
        combinations,
        |windows| {
            SmaCrossoverStrategy::new(params.symbols.clone(), windows[0], windows[1], params.size)
        },
    )?;
    rank_by_equity(&mut runs);

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Fast"),
        Cell::new("Slow"),
        Cell::new("Final Equity"),
        Cell::new("Return"),
        Cell::new("Max Drawdown"),
        Cell::new("Trades"),
    ]));
    for run in runs.iter().take(top) {
        let summary = &run.summary;
        table.add_row(Row::new(vec![
            Cell::new(&run.parameters[0].to_string()),
            Cell::new(&run.parameters[1].to_string()),
            Cell::new(&format!("{:.2}", summary.final_equity)),
            Cell::new(&format!("{:.2}%", summary.total_return_pct * 100.0)),
            Cell::new(&format!("{:.2}%", summary.max_relative_drawdown * 100.0)),
            Cell::new(&summary.num_trades.to_string()),
        ]));
    }
    table.printstd();

    Ok(())
}
