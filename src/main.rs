use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use reckoner::consts::{
    DEFAULT_BOND_FREQUENCY, DEFAULT_DB, DEFAULT_ENGINE_PATH, DEFAULT_ENGINE_TIMEOUT_SECS,
    DEFAULT_MAX_ENGINE_PROCESSES, ENGINE_PATH_ENV,
};
use reckoner::dispatch::Dispatcher;
use reckoner::engine::subprocess::{EngineConfig, FallbackRunner, SubprocessEngine};
use reckoner::records::sqlite::SqliteRecords;
use reckoner::records::RecordStore;
use reckoner::request::{
    ArithmeticOp, BondTerms, CalculationRequest, NpvTerms, OptionKind, OptionTerms, WaccTerms,
};

#[derive(Debug, Clone, ValueEnum)]
enum OpArg {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl From<OpArg> for ArithmeticOp {
    fn from(op: OpArg) -> Self {
        match op {
            OpArg::Addition => ArithmeticOp::Addition,
            OpArg::Subtraction => ArithmeticOp::Subtraction,
            OpArg::Multiplication => ArithmeticOp::Multiplication,
            OpArg::Division => ArithmeticOp::Division,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum KindArg {
    Call,
    Put,
}

impl From<KindArg> for OptionKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Call => OptionKind::Call,
            KindArg::Put => OptionKind::Put,
        }
    }
}

#[derive(Parser)]
#[command(name = "reckoner", version, about = "Typed calculations, local or engine-backed.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the compiled engine binary (RECKONER_ENGINE overrides the default)
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Source-run fallback used when the binary is absent,
    /// e.g. "dotnet run --project ./engine --"
    #[arg(long)]
    fallback: Option<String>,

    /// Engine execution timeout in seconds
    #[arg(short, long, default_value_t = DEFAULT_ENGINE_TIMEOUT_SECS)]
    timeout: u64,

    /// Maximum concurrent engine processes
    #[arg(long, default_value_t = DEFAULT_MAX_ENGINE_PROCESSES)]
    max_engines: usize,

    /// SQLite database path for calculation history (use :memory: for ephemeral)
    #[arg(short, long, default_value = DEFAULT_DB)]
    db: String,
}

#[derive(Subcommand)]
enum Command {
    /// Arithmetic over two or more operands, evaluated in-process
    Arith {
        #[arg(value_enum)]
        op: OpArg,
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<f64>,
    },
    /// Price a bond via the external engine
    Bond {
        #[arg(long)]
        face: f64,
        #[arg(long)]
        coupon: f64,
        #[arg(long)]
        market: f64,
        #[arg(long)]
        years: f64,
        /// Coupon periods per year
        #[arg(long, default_value_t = DEFAULT_BOND_FREQUENCY)]
        frequency: f64,
    },
    /// Weighted average cost of capital via the external engine
    Wacc {
        #[arg(long)]
        equity: f64,
        #[arg(long)]
        debt: f64,
        #[arg(long)]
        cost_of_equity: f64,
        #[arg(long)]
        cost_of_debt: f64,
        #[arg(long)]
        tax_rate: f64,
    },
    /// Price a European option via the external engine
    Option {
        #[arg(long)]
        spot: f64,
        #[arg(long)]
        strike: f64,
        /// Time to expiry in years
        #[arg(long)]
        time: f64,
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        volatility: f64,
        #[arg(long, value_enum)]
        kind: KindArg,
    },
    /// Net present value of a cash-flow sequence via the external engine
    Npv {
        #[arg(long)]
        rate: f64,
        #[arg(required = true, num_args = 1..)]
        flows: Vec<f64>,
    },
    /// Show recent calculations
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let records = SqliteRecords::new(&cli.db)?;

    let request = match cli.command {
        Command::Arith { op, inputs } => CalculationRequest::Arithmetic {
            op: op.into(),
            inputs,
        },
        Command::Bond {
            face,
            coupon,
            market,
            years,
            frequency,
        } => CalculationRequest::Bond(BondTerms {
            face,
            coupon,
            market,
            years,
            frequency,
        }),
        Command::Wacc {
            equity,
            debt,
            cost_of_equity,
            cost_of_debt,
            tax_rate,
        } => CalculationRequest::Wacc(WaccTerms {
            equity,
            debt,
            cost_of_equity,
            cost_of_debt,
            tax_rate,
        }),
        Command::Option {
            spot,
            strike,
            time,
            rate,
            volatility,
            kind,
        } => CalculationRequest::Option(OptionTerms {
            spot,
            strike,
            time,
            rate,
            volatility,
            kind: kind.into(),
        }),
        Command::Npv { rate, flows } => CalculationRequest::Npv(NpvTerms { rate, flows }),
        Command::History { limit } => {
            return print_history(&records, limit).await;
        }
    };

    let config = EngineConfig {
        binary: engine_path(cli.engine),
        fallback: cli.fallback.as_deref().map(parse_fallback).transpose()?,
        timeout: Duration::from_secs(cli.timeout),
        max_processes: cli.max_engines,
    };

    let dispatcher = Dispatcher::new(Box::new(SubprocessEngine::new(config)));

    let outcome = dispatcher
        .dispatch(&request)
        .await
        .context("invalid calculation request")?;
    records.save(&request, &outcome).await?;

    if outcome.succeeded {
        println!("=> {}", outcome.value);
    } else {
        println!("=> {} (engine failure)", outcome.value);
        if let Some(detail) = &outcome.detail {
            eprintln!("engine: {detail}");
        }
    }
    Ok(())
}

/// Resolution order: --engine flag, then RECKONER_ENGINE, then the default.
fn engine_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| {
        std::env::var(ENGINE_PATH_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE_PATH))
}

fn parse_fallback(command: &str) -> anyhow::Result<FallbackRunner> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next().context("empty --fallback command")?;
    Ok(FallbackRunner {
        program: PathBuf::from(program),
        args: parts.collect(),
    })
}

async fn print_history(records: &SqliteRecords, limit: usize) -> anyhow::Result<()> {
    let entries = records.recent(limit).await?;
    if entries.is_empty() {
        println!("no calculations recorded yet");
        return Ok(());
    }
    for record in entries {
        let status = if record.succeeded { "ok" } else { "failed" };
        println!(
            "[{}] #{} {:10} {} => {}",
            record.created_at, record.id, record.category, status, record.value
        );
    }
    Ok(())
}
