//! Command-line arguments passed to the compiler.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::compiler::codegen::Target;

/// Compiler command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "impc", version, about = "Compiler for the Imp expression language")]
pub struct Args {
    /// Input file containing Imp source code.
    pub input: PathBuf,

    /// Output path for assembly emission.
    ///
    /// Defaults to the input path with a `.s` extension.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compilation stage to stop after, printing its result to stdout.
    #[arg(short, long, value_enum)]
    pub stage: Option<Stage>,

    /// Target platform for the emitted assembly.
    ///
    /// Defaults to the host platform.
    #[arg(short, long, value_enum)]
    pub target: Option<TargetName>,
}

/// Compilation phase to terminate at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    /// Print the token stream.
    Lex,
    /// Print the abstract syntax tree.
    Parse,
    /// Run semantic analysis and print the annotated tree.
    Check,
    /// Print the assembly listing instead of writing it to a file.
    Asm,
}

/// Named targets accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetName {
    /// x86-64 Linux (SysV).
    Linux,
    /// x86-64 macOS (SysV, `_`-decorated symbols).
    Macos,
    /// x86-64 Windows (Win64).
    Windows,
}

impl Args {
    /// Returns the selected target, falling back to the host platform.
    #[must_use]
    pub fn target(&self) -> Target {
        match self.target {
            None => Target::host(),
            Some(TargetName::Linux) => Target::LinuxX64,
            Some(TargetName::Macos) => Target::MacX64,
            Some(TargetName::Windows) => Target::WinX64,
        }
    }

    /// Returns the output path, defaulting to the input path with a `.s`
    /// extension.
    #[must_use]
    pub fn out_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("s"))
    }
}
