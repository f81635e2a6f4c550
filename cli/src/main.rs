/*!
mtsample: command-line front end for the MT sampler engine.

Usage:
  # 10 doubles in [0, 1) from seed 42
  mtsample draw --seed 42 --kind double --count 10

  # Continue a stream from a checkpoint and save it again afterwards
  mtsample draw --config stream.json --resume run.ckpt --save run.ckpt --count 100

  # Weighted picks
  mtsample pick --weights 0,0.5,0,0.5 --seed 7 --count 20

  # Weighted picks seeded and tuned by a stream config
  mtsample pick --weights 3,1,0,2 --config stream.json --count 20

  # Raw state blob after skipping 1000 words
  mtsample state --seed 5489 --skip 1000 --out state.bin

Set RUST_LOG (e.g. RUST_LOG=debug) to see engine logging on stderr.
*/

use std::fs;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;

use mt_sampler_core::rng::{Distributions, MersenneTwister, RngError, DEFAULT_SEED};
use mt_sampler_core::sampling::{CumulativeDistribution, DistributionError};
use mt_sampler_core::stream::{load_checkpoint, save_checkpoint, StreamConfig, StreamError};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("Failed to access {path}: {source}")]
    File { path: String, source: io::Error },

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error(transparent)]
    Rng(#[from] RngError),

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

fn usage(message: impl Into<String>) -> CliError {
    CliError::Usage(message.into())
}

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum DrawKind {
    U32,
    Int(i32),
    Long(i64),
    Double,
    DoubleClosed,
    DoubleOpen,
    Float,
    Bool,
    BoolWith(f64),
    Gaussian,
    Bytes,
}

impl FromStr for DrawKind {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, param) = match s.split_once(':') {
            Some((name, param)) => (name, Some(param)),
            None => (s, None),
        };

        let kind = match (name, param) {
            ("u32", None) => DrawKind::U32,
            ("int", Some(n)) => DrawKind::Int(parse_number(n, "int bound")?),
            ("long", Some(n)) => DrawKind::Long(parse_number(n, "long bound")?),
            ("double", None) => DrawKind::Double,
            ("double-closed", None) => DrawKind::DoubleClosed,
            ("double-open", None) => DrawKind::DoubleOpen,
            ("float", None) => DrawKind::Float,
            ("bool", None) => DrawKind::Bool,
            ("bool", Some(p)) => DrawKind::BoolWith(parse_number(p, "probability")?),
            ("gaussian", None) => DrawKind::Gaussian,
            ("bytes", None) => DrawKind::Bytes,
            _ => return Err(usage(format!("Unknown draw kind '{}'", s))),
        };
        Ok(kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DrawArgs {
    config: Option<String>,
    seed: Option<i64>,
    kind: DrawKind,
    count: u64,
    resume: Option<String>,
    save: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct PickArgs {
    weights: Vec<f64>,
    allow_all_zeros: bool,
    config: Option<String>,
    seed: Option<i64>,
    count: u64,
}

#[derive(Debug, Clone, PartialEq)]
struct StateArgs {
    seed: i64,
    skip: u64,
    out: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Draw(DrawArgs),
    Pick(PickArgs),
    State(StateArgs),
    Help,
}

fn parse_number<T: FromStr>(value: &str, what: &str) -> Result<T, CliError> {
    value
        .trim()
        .parse()
        .map_err(|_| usage(format!("Invalid {}: '{}'", what, value)))
}

/// Pull the value following a flag, or fail naming the flag
fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, CliError> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| usage(format!("{} requires a value", flag)))
}

fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let Some(subcommand) = args.first() else {
        return Ok(Command::Help);
    };
    let rest = &args[1..];

    match subcommand.as_str() {
        "draw" => parse_draw(rest).map(Command::Draw),
        "pick" => parse_pick(rest).map(Command::Pick),
        "state" => parse_state(rest).map(Command::State),
        "--help" | "-h" | "help" => Ok(Command::Help),
        other => Err(usage(format!("Unknown command: {}", other))),
    }
}

fn parse_draw(args: &[String]) -> Result<DrawArgs, CliError> {
    let mut parsed = DrawArgs {
        config: None,
        seed: None,
        kind: DrawKind::U32,
        count: 1,
        resume: None,
        save: None,
    };

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" | "-c" => parsed.config = Some(flag_value(args, &mut i, flag)?.to_string()),
            "--seed" | "-s" => parsed.seed = Some(parse_number(flag_value(args, &mut i, flag)?, "seed")?),
            "--kind" | "-k" => parsed.kind = flag_value(args, &mut i, flag)?.parse()?,
            "--count" | "-n" => parsed.count = parse_number(flag_value(args, &mut i, flag)?, "count")?,
            "--resume" => parsed.resume = Some(flag_value(args, &mut i, flag)?.to_string()),
            "--save" => parsed.save = Some(flag_value(args, &mut i, flag)?.to_string()),
            other => return Err(usage(format!("Unknown argument: {}", other))),
        }
        i += 1;
    }

    if parsed.config.is_some() && parsed.seed.is_some() {
        return Err(usage("--config and --seed are mutually exclusive"));
    }
    Ok(parsed)
}

fn parse_pick(args: &[String]) -> Result<PickArgs, CliError> {
    let mut weights = None;
    let mut allow_all_zeros = false;
    let mut config = None;
    let mut seed = None;
    let mut count = 1;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--weights" | "-w" => {
                let list = flag_value(args, &mut i, flag)?;
                weights = Some(
                    list.split(',')
                        .map(|w| parse_number(w, "weight"))
                        .collect::<Result<Vec<f64>, _>>()?,
                );
            }
            "--allow-all-zeros" => allow_all_zeros = true,
            "--config" | "-c" => config = Some(flag_value(args, &mut i, flag)?.to_string()),
            "--seed" | "-s" => seed = Some(parse_number(flag_value(args, &mut i, flag)?, "seed")?),
            "--count" | "-n" => count = parse_number(flag_value(args, &mut i, flag)?, "count")?,
            other => return Err(usage(format!("Unknown argument: {}", other))),
        }
        i += 1;
    }

    if config.is_some() && seed.is_some() {
        return Err(usage("--config and --seed are mutually exclusive"));
    }

    let weights = weights.ok_or_else(|| usage("pick requires --weights"))?;
    Ok(PickArgs {
        weights,
        allow_all_zeros,
        config,
        seed,
        count,
    })
}

fn parse_state(args: &[String]) -> Result<StateArgs, CliError> {
    let mut seed = None;
    let mut skip = 0;
    let mut out = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--seed" | "-s" => seed = Some(parse_number(flag_value(args, &mut i, flag)?, "seed")?),
            "--skip" => skip = parse_number(flag_value(args, &mut i, flag)?, "skip")?,
            "--out" | "-o" => out = Some(flag_value(args, &mut i, flag)?.to_string()),
            other => return Err(usage(format!("Unknown argument: {}", other))),
        }
        i += 1;
    }

    Ok(StateArgs {
        seed: seed.ok_or_else(|| usage("state requires --seed"))?,
        skip,
        out: out.ok_or_else(|| usage("state requires --out"))?,
    })
}

fn print_help() {
    eprintln!("Usage: mtsample <draw|pick|state> [options]");
    eprintln!();
    eprintln!("  draw  [--config FILE | --seed N] [--kind KIND] [--count N]");
    eprintln!("        [--resume CKPT] [--save CKPT]");
    eprintln!("        KIND: u32, int:N, long:N, double, double-closed, double-open,");
    eprintln!("              float, bool, bool:P, gaussian, bytes (default u32)");
    eprintln!("  pick  --weights W1,W2,... [--allow-all-zeros] [--config FILE | --seed N]");
    eprintln!("        [--count N]");
    eprintln!("  state --seed N [--skip N] --out FILE");
}

// ============================================================================
// Commands
// ============================================================================

fn read_file(path: &str) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::File {
        path: path.to_string(),
        source,
    })
}

fn write_file(path: &str, contents: impl AsRef<[u8]>) -> Result<(), CliError> {
    fs::write(path, contents).map_err(|source| CliError::File {
        path: path.to_string(),
        source,
    })
}

/// Produce one draw of `kind`, formatted for output
fn draw_one(rng: &mut MersenneTwister, kind: &DrawKind) -> Result<String, RngError> {
    let line = match kind {
        DrawKind::U32 => rng.next_u32().to_string(),
        DrawKind::Int(n) => rng.next_int(*n)?.to_string(),
        DrawKind::Long(n) => rng.next_long(*n)?.to_string(),
        DrawKind::Double => rng.next_double().to_string(),
        DrawKind::DoubleClosed => rng.next_double_in(true, true).to_string(),
        DrawKind::DoubleOpen => rng.next_double_in(false, false).to_string(),
        DrawKind::Float => rng.next_float().to_string(),
        DrawKind::Bool => rng.next_boolean().to_string(),
        DrawKind::BoolWith(p) => rng.next_boolean_with(*p)?.to_string(),
        DrawKind::Gaussian => rng.next_gaussian().to_string(),
        DrawKind::Bytes => {
            let mut byte = [0u8; 1];
            rng.fill_bytes(&mut byte);
            format!("{:02x}", byte[0])
        }
    };
    Ok(line)
}

/// Stream config from `--config`, else a scalar config from `--seed`
fn load_config(path: Option<&String>, seed: Option<i64>) -> Result<StreamConfig, CliError> {
    match path {
        Some(path) => Ok(StreamConfig::from_json(&read_file(path)?)?),
        None => Ok(StreamConfig::scalar(seed.unwrap_or(DEFAULT_SEED))),
    }
}

fn run_draw(args: &DrawArgs, out: &mut impl Write) -> Result<(), CliError> {
    let config = load_config(args.config.as_ref(), args.seed)?;

    let (mut rng, mut draws) = match &args.resume {
        Some(path) => {
            let (rng, draws) = load_checkpoint(&config, &read_file(path)?)?;
            tracing::info!(path = %path, draws, "resumed stream from checkpoint");
            (rng, draws)
        }
        None => (config.build()?, 0),
    };

    for _ in 0..args.count {
        writeln!(out, "{}", draw_one(&mut rng, &args.kind)?)?;
        draws += 1;
    }
    out.flush()?;

    if let Some(path) = &args.save {
        write_file(path, save_checkpoint(&config, &rng, draws)?)?;
        tracing::info!(path = %path, draws, "saved checkpoint");
    }
    Ok(())
}

fn run_pick(args: &PickArgs, out: &mut impl Write) -> Result<(), CliError> {
    let config = load_config(args.config.as_ref(), args.seed)?;
    let distribution = CumulativeDistribution::from_weights(args.weights.clone(), args.allow_all_zeros)?;
    let mut rng = config.build()?;

    for _ in 0..args.count {
        let index = config.pick_index(distribution.as_slice(), rng.next_double())?;
        writeln!(out, "{}", index)?;
    }
    out.flush()?;
    Ok(())
}

fn run_state(args: &StateArgs) -> Result<(), CliError> {
    let mut rng = MersenneTwister::new(args.seed);
    for _ in 0..args.skip {
        rng.next_u32();
    }
    write_file(&args.out, rng.write_state())?;
    tracing::info!(path = %args.out, index = rng.index(), "wrote state blob");
    Ok(())
}

fn run(command: &Command) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match command {
        Command::Draw(args) => run_draw(args, &mut out),
        Command::Pick(args) => run_pick(args, &mut out),
        Command::State(args) => run_state(args),
        Command::Help => {
            print_help();
            Ok(())
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args).and_then(|command| run(&command));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if matches!(e, CliError::Usage(_)) {
            print_help();
        }
        std::process::exit(1);
    }
}
