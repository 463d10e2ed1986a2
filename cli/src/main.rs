use anyhow::Context;
use clap::{ArgAction, Parser};
use dice_engine::{EngineConfig, EntropySource, OsEntropy, RollEngine, RollRequest, RollResult, SeededEntropy};
use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const VALIDATION_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = "Dice roller", bin_name = "dice-roller")]
#[command(version = concat!("v", env!("CARGO_PKG_VERSION")))]
#[command(about = "Dice roller for D&D.", allow_negative_numbers = true)]
struct Cli {
    /// Is to show sum calculation? (values: true, false)
    #[arg(value_name = "detailed", action = ArgAction::Set, value_parser = clap::value_parser!(bool))]
    detailed: bool,
    /// How many rolls should the program make?
    #[arg(value_name = "rollCount")]
    roll_count: i64,
    /// Number of sides the die has
    #[arg(value_name = "dieSize")]
    die_size: i64,
    /// Added once per roll
    #[arg(value_name = "constantAddition", default_value_t = 0)]
    constant_addition: i64,
    /// JSON engine configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Worker threads for large rolls (overrides the config file)
    #[arg(long)]
    workers: Option<usize>,
    /// Fixed RNG seed for reproducible debugging; never use for real games
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn request(&self) -> RollRequest {
        RollRequest::new(self.roll_count, self.die_size, self.constant_addition, self.detailed)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    eprintln!("Starting...");
    init_tracing();
    let cli = Cli::parse();

    let request = cli.request();
    let violations = request.validate();
    if !violations.is_empty() {
        for v in &violations {
            eprintln!("ERROR: {v}");
        }
        eprintln!("Try 'dice-roller --help' for more information.");
        return ExitCode::from(VALIDATION_EXIT);
    }

    match run(&cli, &request) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, request: &RollRequest) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    }
    .with_workers(cli.workers)?;
    debug!(?config, ?request, "resolved roll");

    let source: Box<dyn EntropySource> = match cli.seed {
        Some(seed) => {
            warn!(seed, "fixed seed in use, rolls are reproducible");
            Box::new(SeededEntropy::new(seed))
        }
        None => Box::new(OsEntropy),
    };

    eprintln!("Rolling...");
    let result = RollEngine::new(config)
        .roll(request, source.as_ref())
        .context("roll failed")?;
    print_result(&result)
}

fn print_result(result: &RollResult) -> anyhow::Result<()> {
    if let Some(expr) = result.expression() {
        let mut err = io::stderr().lock();
        write!(err, "{expr}")?;
        err.flush()?;
    }
    let mut out = io::stdout().lock();
    writeln!(out, "{result}")?;
    Ok(())
}
