//! Compiler binary: parses arguments, runs the pipeline, renders
//! diagnostics.

#![forbid(unsafe_code)]

use std::{fs, process};

use anyhow::Context as _;
use clap::Parser as _;
use colored::Colorize as _;

use impc::args::{Args, Stage};
use impc::compiler::lexer::Lexer;
use impc::compiler::{driver, parser, sema};
use impc::error::CompileError;

/// Why a run did not produce output.
enum Failure {
    Compile(CompileError),
    Other(anyhow::Error),
}

impl From<CompileError> for Failure {
    fn from(err: CompileError) -> Self {
        Failure::Compile(err)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::Other(err)
    }
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => {}
        Err(Failure::Compile(err)) => {
            for msg in err.messages() {
                eprintln!("{}: {msg}", "error".red().bold());
            }
            eprintln!(
                "{}: {} stage failed with {} error(s)",
                "error".red().bold(),
                err.stage().bold(),
                err.messages().len()
            );
            process::exit(1);
        }
        Err(Failure::Other(err)) => {
            eprintln!("{}: {err:#}", "error".red().bold());
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<(), Failure> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read input file '{}'", args.input.display()))?;

    match args.stage {
        Some(Stage::Lex) => {
            print!("{}", Lexer::new(&source));
        }
        Some(Stage::Parse) => {
            let program = parser::parse(&source).map_err(CompileError::Syntax)?;
            print!("{program}");
        }
        Some(Stage::Check) => {
            let mut program = parser::parse(&source).map_err(CompileError::Syntax)?;
            sema::analyze(&mut program).map_err(CompileError::Type)?;
            print!("{program}");
        }
        Some(Stage::Asm) => {
            let listing = driver::compile(&source, args.target())?;
            print!("{listing}");
        }
        None => {
            let listing = driver::compile(&source, args.target())?;
            let out_path = args.out_path();

            fs::write(&out_path, listing).with_context(|| {
                format!("failed to write output file '{}'", out_path.display())
            })?;
        }
    }

    Ok(())
}
