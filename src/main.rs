//! Command-line front end: check, format and generate VdM beam-trim sequences.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand};

use vdm::config::{default_config_path, Config};
use vdm::dsl::commands::COMMANDS;
use vdm::dsl::Parser;
use vdm::generator::{number_statements, parse_array, parse_function, Trajectory};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to ~/.vdm/config.yaml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Validate a sequence and list every problem
    Check {
        /// Sequence file, or - for stdin
        #[arg(value_name = "FILE")]
        file: String,

        /// Input is a bare body numbered from 1; synthesize the header
        #[arg(long)]
        header: bool,

        /// Print diagnostics as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Print a sequence in canonical form
    Fmt {
        /// Sequence file, or - for stdin
        #[arg(value_name = "FILE")]
        file: String,

        /// Input is a bare body numbered from 1; synthesize the header
        #[arg(long)]
        header: bool,

        /// Input is a JSON array of line entities rather than text
        #[arg(long, conflicts_with = "header")]
        from_json: bool,
    },
    /// Generate trim statements from functions or position arrays
    Generate {
        /// Trajectory expression per channel, e.g. "linear(-4,4)"
        #[arg(short, long = "function", value_name = "EXPR", conflicts_with = "array")]
        function: Vec<String>,

        /// Comma-separated positions per channel
        #[arg(short, long, value_name = "LIST")]
        array: Vec<String>,

        #[arg(long)]
        ip: Option<String>,

        #[arg(long)]
        unit: Option<String>,

        /// Seconds between samples
        #[arg(short, long)]
        wait: Option<f64>,

        /// Number of samples per function
        #[arg(short, long)]
        steps: Option<usize>,

        /// Emit a complete numbered sequence with header and END_SEQUENCE
        #[arg(long)]
        wrap: bool,
    },
    /// List the known commands and their arguments
    Commands,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(args: Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    log::debug!(
        "config {:?} from {:?}",
        config,
        args.config.clone().or_else(default_config_path)
    );

    match args.command {
        Cmd::Check { file, header, json } => {
            let source = read_input(&file)?;
            let errors = Parser::validate(&source, header || config.header_mode);
            if json {
                println!("{}", serde_json::to_string_pretty(&errors)?);
            } else {
                for e in &errors {
                    println!("{e}");
                }
            }
            Ok(if errors.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Cmd::Fmt {
            file,
            header,
            from_json,
        } => {
            let source = read_input(&file)?;
            let formatted = if from_json {
                vdm::dsl::deparse_entities(&source)
            } else {
                Parser::format(&source, header || config.header_mode)
            };
            match formatted {
                Ok(text) => {
                    print!("{text}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(diagnostics) => {
                    eprintln!("{diagnostics}");
                    Ok(ExitCode::from(1))
                }
            }
        }
        Cmd::Generate {
            function,
            array,
            ip,
            unit,
            wait,
            steps,
            wrap,
        } => {
            let mut config = config;
            if let Some(ip) = ip {
                config.ip = ip;
            }
            if let Some(unit) = unit {
                config.unit = unit;
            }
            let generator = config
                .generator()
                .context("invalid --ip or --unit")?;
            let wait = wait.unwrap_or(config.wait_time);
            let steps = steps.unwrap_or(config.step_count);

            let block = if !function.is_empty() {
                let trajectories = function
                    .iter()
                    .enumerate()
                    .map(|(i, text)| parse_function(text, i).map(Trajectory::from))
                    .collect::<Result<Vec<_>, _>>()?;
                generator.generate_from_function(&trajectories, wait, steps)?
            } else if !array.is_empty() {
                let arrays = array
                    .iter()
                    .enumerate()
                    .map(|(i, text)| parse_array(text, i))
                    .collect::<Result<Vec<_>, _>>()?;
                generator.generate_from_array(&arrays, wait)?
            } else {
                bail!("give at least one --function or --array");
            };

            if !wrap {
                println!("{block}");
                return Ok(ExitCode::SUCCESS);
            }
            let body = number_statements(&block, 1);
            let text = Parser::format(&body, true).context("generated block does not validate")?;
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Commands => {
            let mut names: Vec<_> = COMMANDS.entries().collect();
            names.sort_by_key(|(name, _)| **name);
            for (name, info) in names {
                println!("{name} {}", info.usage);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        return Ok(source);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read {file}"))
}
