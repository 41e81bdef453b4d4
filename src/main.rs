//! # gs
//!
//! Command line driver for the gs interpreter. It runs a source file
//! (or standard input), prints the final value, and can dump the token
//! stream or the parsed AST instead.

use std::io::Read;
use std::path::PathBuf;
use std::{fs, io, process};

use clap::{Parser as ClapParser, ValueEnum};
use log::debug;

use gs_lang::error::GsError;
use gs_lang::interpreter::{Interpreter, RuntimeError};
use gs_lang::lexer::Lexer;
use gs_lang::parser::Parser;

/// Struct containing the CLI configuration for gs.
#[derive(ClapParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to a .gs file. If omitted, the source is read from
    /// standard input.
    file: Option<PathBuf>,

    /// Print the token stream and exit.
    #[arg(long)]
    tokens: bool,

    /// Print the parsed AST and exit.
    #[arg(long)]
    ast: bool,

    /// Specify the log level of the interpreter.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    verbosity: LogLevel,
}

/// Enum for specifying the log level of gs.
#[derive(ValueEnum, Clone, Default, Debug)]
enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// A log level, where also warnings are logged.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the
    /// interpreter, e.g., which files are loaded.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the interpreter.
    #[value(alias("3"))]
    Debug,

    /// Log extra information. This can include more precise debug
    /// output or even non-important errors.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

fn main() {
    let args = Cli::parse();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    if let Err(error) = run(&args) {
        eprintln!("Error: {error}");
        process::exit(1);
    }
}

fn run(args: &Cli) -> Result<(), GsError> {
    let source = read_source(args)?;

    debug!("lexing {} characters", source.chars().count());
    let tokens = Lexer::new(&source).tokenize()?;

    if args.tokens {
        for token in &tokens {
            println!("{token}");
        }
        return Ok(());
    }

    let program = Parser::new(tokens).parse_program()?;

    if args.ast {
        for statement in &program {
            println!("{statement:?}");
        }
        return Ok(());
    }

    let mut interpreter = Interpreter::new()?;
    let result = interpreter.run(&program)?;

    // host output, not the language-level print
    println!("{result}");
    Ok(())
}

fn read_source(args: &Cli) -> Result<String, GsError> {
    match &args.file {
        Some(file) => {
            debug!("reading source from '{}'", file.display());
            fs::read_to_string(file).map_err(|error| {
                GsError::Runtime(RuntimeError::new(format!(
                    "Could not read file '{}': {error}",
                    file.display()
                )))
            })
        }
        None => {
            debug!("reading source from stdin");
            let mut source = String::new();
            io::stdin().read_to_string(&mut source).map_err(|error| {
                GsError::Runtime(RuntimeError::new(format!(
                    "Could not read from stdin: {error}"
                )))
            })?;
            Ok(source)
        }
    }
}
