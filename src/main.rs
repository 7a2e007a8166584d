//! Genesis CLI: run a script, or dump one of its intermediate forms.

use std::env;
use std::fs;
use std::process;

use colored::Colorize;
use tracing_subscriber::EnvFilter;

use genesis::{parse_define, run_with_options, OutputMode, PipelineOptions};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("Genesis {}", VERSION);
    eprintln!();
    eprintln!("Usage: genesis [options] <script>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --tokens          Print the preprocessed tokens");
    eprintln!("  --ast             Print the syntax tree");
    eprintln!("  --bytecode        Print the compiled bytecode");
    eprintln!("  -D NAME=VALUE     Define NAME before preprocessing");
    eprintln!("  --help, -h        Show this help message");
    eprintln!();
    eprintln!("Set RUST_LOG=info to trace the pipeline stages.");
}

/// Parsed command line.
struct Options {
    path: String,
    pipeline: PipelineOptions,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    process::exit(1);
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut pipeline = PipelineOptions::default();
    let mut path = None;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--tokens" => pipeline.mode = OutputMode::Tokens,
            "--ast" => pipeline.mode = OutputMode::Ast,
            "--bytecode" => pipeline.mode = OutputMode::Bytecode,
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "-D" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("-D requires NAME=VALUE");
                    print_usage();
                    process::exit(1);
                }
                let (name, value) = parse_define(&args[i]).unwrap_or_else(|e| fail(e));
                pipeline.defines.define(name, value);
            }
            arg if arg.starts_with("-D") => {
                let (name, value) = parse_define(&arg[2..]).unwrap_or_else(|e| fail(e));
                pipeline.defines.define(name, value);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                print_usage();
                process::exit(1);
            }
            _ => {
                if path.is_some() {
                    eprintln!("Unexpected argument: {}", arg);
                    print_usage();
                    process::exit(1);
                }
                path = Some(arg.clone());
            }
        }
        i += 1;
    }

    match path {
        Some(path) => Options { path, pipeline },
        None => {
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = parse_args();

    let source = match fs::read_to_string(&options.path) {
        Ok(source) => source,
        Err(e) => fail(format!("Could not read '{}': {}", options.path, e)),
    };

    match run_with_options(&source, &options.pipeline) {
        Ok(output) => print!("{}", output),
        Err(e) => match e.line() {
            Some(line) => fail(format!("{} [{}:{}]", e, options.path, line)),
            None => fail(e),
        },
    }
}
