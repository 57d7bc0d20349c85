//! toggle-bench binary
//!
//! Run with: `toggle-bench [TURNS] [--slots 64,4096,262144]`

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use toggle_bench::config::{DEFAULT_MAX_SEQUENCE_SLOTS, DEFAULT_SLOT_SERIES, DEFAULT_TURNS};
use toggle_bench::generator::DEFAULT_SEED;
use toggle_bench::report::{write_banner, write_table};
use toggle_bench::{BenchConfig, Matrix, ResultsTable};

#[derive(Parser)]
#[command(name = "toggle-bench")]
#[command(about = "Benchmark find-toggle-remove over slot representations and containers")]
#[command(version)]
struct Cli {
    /// Draws per benchmark cell
    #[arg(default_value_t = DEFAULT_TURNS, value_parser = clap::value_parser!(u64).range(1..))]
    turns: u64,

    /// Slot counts to benchmark, one table column each
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SLOT_SERIES)]
    slots: Vec<u64>,

    /// Skip sequence containers above this many slots
    #[arg(long, default_value_t = DEFAULT_MAX_SEQUENCE_SLOTS)]
    max_sequence_slots: u64,

    /// Generator seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Run a discarded warm-up pass before each timed cell
    #[arg(long)]
    warmup: bool,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Do not print progress dots
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn config(&self) -> BenchConfig {
        BenchConfig {
            turns: self.turns,
            slot_series: self.slots.clone(),
            max_sequence_slots: self.max_sequence_slots,
            warmup: self.warmup,
            seed: self.seed,
        }
    }
}

fn run(cli: &Cli) -> toggle_bench::Result<()> {
    let matrix = Matrix::new(cli.config())?;
    let config = matrix.config();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_banner(&mut out, config.turns)?;

    let mut table = ResultsTable::new();
    if cli.quiet {
        matrix.run(&mut table, &mut io::sink())?;
    } else {
        matrix.run(&mut table, &mut out)?;
    }
    writeln!(out)?;

    write_table(&mut out, &table, &config.slot_series)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "toggle_bench=warn",
        1 => "toggle_bench=info",
        2 => "toggle_bench=debug",
        _ => "toggle_bench=trace",
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
