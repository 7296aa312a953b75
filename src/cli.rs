//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_adapter::{CsvSink, CsvSource};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config::RunConfig;
use crate::domain::config_validation::validate_config;
use crate::domain::equity::trades_to_equity;
use crate::domain::error::SigtradeError;
use crate::domain::frame::Column;
use crate::domain::pipeline::{Pipeline, Summary};
use crate::domain::resolver::Resolver;
use crate::domain::series::{Series, format_timestamp};
use crate::domain::signal::SignalFrame;
use crate::domain::trades::TradesTable;
use crate::domain::view::IndexedView;
use crate::ports::data_port::DataSource;
use crate::ports::output_port::OutputPort;

#[derive(Parser, Debug)]
#[command(
    name = "sigtrade",
    about = "Translate trading signals into positions and realized equity"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve signal columns into a position series
    Positions {
        #[arg(short, long)]
        signals: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Position held before the first bar
        #[arg(long, allow_negative_numbers = true)]
        init_pos: Option<f64>,
        /// Emit every bar instead of change points only
        #[arg(long)]
        full: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the last N rows to stderr
        #[arg(long)]
        tail: Option<usize>,
    },
    /// Derive realized equity from a trades table
    Equity {
        #[arg(short, long)]
        trades: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        tail: Option<usize>,
    },
    /// Signals to positions, trades and per-bar equity in one pass
    Run {
        #[arg(short, long)]
        signals: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write the derived trades table here
        #[arg(long)]
        trades_out: Option<PathBuf>,
        #[arg(long)]
        tail: Option<usize>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Describe the columns of a CSV file
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Positions {
            signals,
            config,
            init_pos,
            full,
            output,
            tail,
        } => run_positions(
            &signals,
            config.as_deref(),
            init_pos,
            full,
            output.as_deref(),
            tail,
        ),
        Command::Equity {
            trades,
            config,
            output,
            tail,
        } => run_equity(&trades, config.as_deref(), output.as_deref(), tail),
        Command::Run {
            signals,
            config,
            output,
            trades_out,
            tail,
        } => run_pipeline(
            &signals,
            config.as_deref(),
            output.as_deref(),
            trades_out.as_deref(),
            tail,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data } => run_info(&data),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Without a path every setting takes its default.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, SigtradeError> {
    match path {
        None => Ok(FileConfigAdapter::empty()),
        Some(path) => {
            info!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| SigtradeError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
    }
}

pub fn load_run_config(path: Option<&Path>) -> Result<RunConfig, SigtradeError> {
    let adapter = load_config(path)?;
    validate_config(&adapter)?;
    RunConfig::from_config(&adapter)
}

fn load_source(path: &Path) -> Result<CsvSource, SigtradeError> {
    info!("Loading data from {}", path.display());
    CsvSource::from_path(path)
}

fn no_data(path: &Path) -> SigtradeError {
    SigtradeError::NoData {
        source_name: path.display().to_string(),
    }
}

fn write_series(output: Option<&Path>, name: &str, series: &Series) -> Result<(), SigtradeError> {
    match output {
        Some(path) => {
            CsvSink::create(path)?.write_series(name, series)?;
            info!("Wrote {} rows to {}", series.len(), path.display());
            Ok(())
        }
        None => CsvSink::stdout().write_series(name, series),
    }
}

fn print_tail(name: &str, series: &Series, n: usize) {
    let view = IndexedView::new(series.len(), |i| (series.index[i], series.values[i]));
    let tail = view.tail(n);
    eprintln!("\nLast {} of {} rows ({}):", tail.len(), view.len(), name);
    for (ts, value) in tail.iter() {
        eprintln!("  {}  {}", format_timestamp(ts), value);
    }
}

fn run_positions(
    signals_path: &Path,
    config_path: Option<&Path>,
    init_pos: Option<f64>,
    full: bool,
    output: Option<&Path>,
    tail: Option<usize>,
) -> Result<(), SigtradeError> {
    let mut config = load_run_config(config_path)?;
    if let Some(p) = init_pos {
        config.init_pos = p;
    }
    if full {
        config.compact = false;
    }

    let source = load_source(signals_path)?;
    let signals = SignalFrame::extract(&source, &config.mask)?.ok_or_else(|| no_data(signals_path))?;

    let resolver = Resolver::new(config.backend);
    let positions = if config.compact {
        resolver.resolve(&signals, config.init_pos)?
    } else {
        resolver.scan(&signals, config.init_pos)?
    };
    info!(
        "Resolved {} bars into {} rows ({} backend)",
        signals.len(),
        positions.len(),
        config.backend
    );

    write_series(output, "position", &positions)?;
    if let Some(n) = tail {
        print_tail("position", &positions, n);
    }
    Ok(())
}

fn run_equity(
    trades_path: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
    tail: Option<usize>,
) -> Result<(), SigtradeError> {
    let config = load_run_config(config_path)?;
    let source = load_source(trades_path)?;
    let trades = TradesTable::extract(&source, &config.trade_columns)?
        .ok_or_else(|| no_data(trades_path))?;

    let equity = trades_to_equity(&trades);
    write_series(output, "equity", &equity)?;

    eprintln!("\n=== Equity ===");
    eprintln!("Rows:             {}", equity.len());
    eprintln!(
        "Realized events:  {}",
        equity.values.iter().filter(|v| **v != 0.0).count()
    );
    eprintln!("Total P&L:        {:.2}", equity.sum());
    if let Some(n) = tail {
        print_tail("equity", &equity, n);
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    eprintln!("\n=== Summary ===");
    eprintln!("Bars:             {}", summary.bars);
    eprintln!("Position changes: {}", summary.position_changes);
    eprintln!("Trades:           {}", summary.trades);
    eprintln!("Realized events:  {}", summary.realized_events);
    eprintln!("Total P&L:        {:.2}", summary.total_pnl);
}

fn run_pipeline(
    signals_path: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
    trades_out: Option<&Path>,
    tail: Option<usize>,
) -> Result<(), SigtradeError> {
    let config = load_run_config(config_path)?;
    let source = load_source(signals_path)?;
    let out = Pipeline::new(&config).run(&source, &signals_path.display().to_string())?;

    if let Some(path) = trades_out {
        CsvSink::create(path)?.write_trades(&out.trades)?;
        info!("Wrote {} trades to {}", out.trades.len(), path.display());
    }
    write_series(output, "equity", &out.bar_equity)?;

    print_summary(&out.summary());
    if let Some(n) = tail {
        print_tail("equity", &out.bar_equity, n);
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SigtradeError> {
    let adapter = load_config(Some(config_path))?;
    validate_config(&adapter)?;
    let config = RunConfig::from_config(&adapter)?;

    eprintln!("\nSignals:");
    eprintln!("  long_enter:  {}", config.mask.long_enter);
    eprintln!("  long_exit:   {}", config.mask.long_exit);
    eprintln!("  short_enter: {}", config.mask.short_enter);
    eprintln!("  short_exit:  {}", config.mask.short_exit);
    eprintln!("  init_pos:    {}", config.init_pos);
    eprintln!("\nResolver backend: {}", config.backend);
    eprintln!(
        "Trades columns:   {}, {}, {}",
        config.trade_columns.volume, config.trade_columns.price, config.trade_columns.position
    );
    eprintln!(
        "Execution:        price {} lag {}",
        config.price_column, config.lag
    );
    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn run_info(data_path: &Path) -> Result<(), SigtradeError> {
    let source = load_source(data_path)?;
    match (source.index().first(), source.index().last()) {
        (Some(first), Some(last)) => println!(
            "{}: {} rows, {} to {}",
            data_path.display(),
            source.len(),
            format_timestamp(*first),
            format_timestamp(*last)
        ),
        _ => println!("{}: no rows", data_path.display()),
    }

    for name in source.names() {
        match source.get(&name) {
            Some(Column::Series(s)) => {
                let missing = s.values.iter().filter(|v| v.is_nan()).count();
                let nonzero = s.values.iter().filter(|v| **v != 0.0 && !v.is_nan()).count();
                println!("  {name}: series, {nonzero} nonzero, {missing} missing");
            }
            Some(other) => println!("  {name}: {}", other.kind()),
            None => {}
        }
    }
    Ok(())
}
