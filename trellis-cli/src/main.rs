//! # trellis
//! Command-line front end for discrete hidden Markov model inference.
//!
//! Each subcommand reads one problem file (query line, labels and matrices
//! separated by `--------` lines), runs a single query and prints a single
//! result line:
//! ```bash
//!  trellis path-prob      path_problem.txt
//!  trellis emission-prob  emission_problem.txt
//!  trellis forward        sequence_problem.txt
//!  trellis viterbi        sequence_problem.txt --output decoded.txt
//! ```

use cli::{get_cli_params, handle_error_and_exit, Command};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time;
use trellis_core::Result;
use trellis_hmm::{parse_input_file, InferenceConfig, InferenceOptions, ParsedInput};

mod cli;
mod render;

fn run_query(
    command: &Command,
    parsed: &ParsedInput,
    options: &InferenceOptions,
) -> Result<String> {
    let ParsedInput {
        model,
        sequence,
        path,
        ..
    } = parsed;
    let line = match command {
        Command::PathProb(_) => render::probability(model.path_probability(path)?),
        Command::EmissionProb(_) => {
            render::probability(model.conditional_emission_probability(sequence, path)?)
        }
        Command::Forward(_) => {
            render::probability(model.forward_with(sequence, options)?.probability())
        }
        Command::Viterbi(_) => model.viterbi_with(sequence, options)?.render(model),
    };
    Ok(line)
}

fn write_result(line: &str, output: Option<&std::path::Path>) -> Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    writeln!(writer, "{line}")?;
    writer.flush()?;
    Ok(())
}

fn main() {
    let params = get_cli_params();
    log::info!("Running {}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    let start_timer = time::Instant::now();

    let args = params.command.args();
    let kind = params.command.kind();
    log::info!("Reading {:?} problem from {}", kind, args.input.display());

    let config = InferenceConfig {
        tolerance: args.tolerance,
        ..InferenceConfig::default()
    };
    let parsed = parse_input_file(&args.input, kind, &config)
        .unwrap_or_else(|err| handle_error_and_exit(err));
    if !parsed.warnings.is_empty() {
        log::info!("{} matrix row(s) are not stochastic", parsed.warnings.len());
    }

    let options = InferenceOptions::new(config);
    let line = run_query(&params.command, &parsed, &options)
        .unwrap_or_else(|err| handle_error_and_exit(err));
    write_result(&line, args.output.as_deref())
        .unwrap_or_else(|err| handle_error_and_exit(err));

    log::info!("Total execution time: {:?}", start_timer.elapsed());
}
