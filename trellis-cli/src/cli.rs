use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use std::io::Write;
use std::path::{Path, PathBuf};
use trellis_core::DEFAULT_TOLERANCE;
use trellis_hmm::QueryKind;

#[derive(Parser)]
#[command(name = "trellis",
          version,
          about = "Hidden Markov model inference",
          long_about = None,
          after_help = format!("Copyright (C) 2023-{}     The trellis developers", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(help = "Increase log verbosity (-v info, -vv debug, -vvv trace)")]
    #[clap(action = clap::ArgAction::Count)]
    #[clap(global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Probability of a hidden path under the transition matrix
    PathProb(QueryArgs),
    /// Probability of an observed sequence given a hidden path
    EmissionProb(QueryArgs),
    /// Total likelihood of an observed sequence (forward algorithm)
    Forward(QueryArgs),
    /// Most probable hidden path for an observed sequence (Viterbi)
    Viterbi(QueryArgs),
}

impl Command {
    pub fn kind(&self) -> QueryKind {
        match self {
            Command::PathProb(_) => QueryKind::PathProbability,
            Command::EmissionProb(_) => QueryKind::EmissionProbability,
            Command::Forward(_) => QueryKind::Likelihood,
            Command::Viterbi(_) => QueryKind::Decode,
        }
    }

    pub fn args(&self) -> &QueryArgs {
        match self {
            Command::PathProb(args)
            | Command::EmissionProb(args)
            | Command::Forward(args)
            | Command::Viterbi(args) => args,
        }
    }
}

#[derive(Args)]
pub struct QueryArgs {
    #[clap(help = "Problem file: query line(s), labels and matrices separated by '--------'")]
    #[clap(value_name = "INPUT")]
    #[arg(value_parser = check_file_exists)]
    pub input: PathBuf,

    #[clap(long = "output")]
    #[clap(short = 'o')]
    #[clap(help = "Write the result here instead of stdout")]
    #[clap(value_name = "OUTPUT")]
    #[arg(value_parser = check_output_path)]
    pub output: Option<PathBuf>,

    #[clap(long = "tolerance")]
    #[clap(help = "Allowed deviation of a matrix row sum from 1 before warning")]
    #[clap(value_name = "TOLERANCE")]
    #[clap(default_value_t = DEFAULT_TOLERANCE)]
    #[arg(value_parser = tolerance_in_range)]
    pub tolerance: f64,
}

pub fn get_cli_params() -> Cli {
    let args = Cli::parse();
    init_logger(args.verbosity);
    args
}

fn init_logger(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .parse_default_env()
        .init();
}

pub fn handle_error_and_exit(err: impl std::fmt::Display) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

fn check_file_exists(s: &str) -> Result<PathBuf, String> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn check_output_path(s: &str) -> Result<PathBuf, String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

fn tolerance_in_range(s: &str) -> Result<f64, String> {
    let tol: f64 = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid tolerance", s))?;
    if tol.is_finite() && tol >= 0.0 {
        Ok(tol)
    } else {
        Err("Tolerance must be a non-negative number".into())
    }
}
