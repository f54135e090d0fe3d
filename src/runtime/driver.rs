//! Program driver: runs a script end to end and maps failures to exit codes.

use std::{
    cell::RefCell,
    fs,
    io::{self, Write},
    path::Path,
    rc::Rc,
};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{ast::ast::StmtType, errors::errors::Error};

use super::{objects::Value, runner::Runner, stdlib::StdLib};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_FATAL: i32 = 9;

pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Environment variable overriding the call depth limit.
pub const MAX_DEPTH_VAR: &str = "VIOLET_MAX_DEPTH";

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Return errors raw instead of formatting diagnostics.
    pub debug: bool,
    pub max_depth: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            debug: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RunOptions {
    /// Options for the command line, reading the depth limit from the
    /// environment.
    pub fn from_env(debug: bool) -> Self {
        let max_depth = match std::env::var(MAX_DEPTH_VAR) {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => depth,
                _ => {
                    warn!("ignoring invalid {}={:?}", MAX_DEPTH_VAR, raw);
                    DEFAULT_MAX_DEPTH
                }
            },
            Err(_) => DEFAULT_MAX_DEPTH,
        };

        RunOptions { debug, max_depth }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("could not read '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("missing entry point function 'main'")]
    MissingEntryPoint,
    /// Every syntax error in the entry file, in source order.
    #[error("{} syntax error(s)", .0.len())]
    Syntax(Vec<Error>),
    #[error(transparent)]
    Program(#[from] Error),
}

impl DriverError {
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::Program(error) if error.is_fatal() => EXIT_FATAL,
            _ => EXIT_FAILURE,
        }
    }
}

/// Runs the top level of `source`, then `main` with the synthesized `argv`.
pub fn execute(runner: &mut Runner, source: String) -> Result<(), DriverError> {
    let ast = runner.parse_module(source).map_err(DriverError::Syntax)?;
    runner.run_module(&ast)?;

    let main = runner
        .lookup_global("main")
        .map_err(|_| DriverError::MissingEntryPoint)?;

    let argv = Value::list(vec![Value::String(runner.file().to_string())]);
    debug!(argv = %argv, "invoking main");

    let result = runner.call_value(&main, vec![argv]);
    match (result, &main) {
        (Ok(_), _) => Ok(()),
        // Failures of the call itself are reported at the declaration of main.
        (Err(error), Value::Function(function)) if !runner.debug => {
            Err(error.at_statement(StmtType::FnDeclStmt, &function.position).into())
        }
        (Err(error), _) => Err(error.into()),
    }
}

/// Writes the diagnostic for `error` and returns the exit code.
pub fn report(error: &DriverError, diagnostics: &mut dyn Write) -> i32 {
    let written = match error {
        DriverError::Program(error) if error.is_fatal() => {
            writeln!(diagnostics, "FATAL: system error occured: {}", error)
        }
        DriverError::Program(error) => writeln!(diagnostics, "ERROR:{}: {}", error.get_line(), error),
        DriverError::Syntax(errors) => errors
            .iter()
            .try_for_each(|error| writeln!(diagnostics, "ERROR:{}: {}", error.get_line(), error)),
        other => writeln!(diagnostics, "ERROR: {}", other),
    };

    if let Err(io_error) = written {
        warn!("failed to write diagnostic: {}", io_error);
    }
    error.exit_code()
}

/// Runs the script at `path` with the default standard library, printing to
/// stdout and reporting to stderr. Returns the process exit code.
pub fn run_file(path: &Path, options: &RunOptions) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(source) => {
            let error = DriverError::Unreadable {
                path: path.display().to_string(),
                source,
            };
            return finish(Err(error), options);
        }
    };

    let stdout = Rc::new(RefCell::new(io::stdout()));
    let output: Rc<RefCell<dyn Write>> = stdout.clone();
    let mut runner = Runner::new(path.display().to_string(), options, Rc::new(StdLib::default()), output);

    let result = execute(&mut runner, source);
    if let Err(io_error) = stdout.borrow_mut().flush() {
        warn!("failed to flush output: {}", io_error);
    }

    finish(result, options)
}

fn finish(result: Result<(), DriverError>, options: &RunOptions) -> i32 {
    match result {
        Ok(()) => {
            info!("program finished");
            EXIT_SUCCESS
        }
        Err(error) if options.debug => {
            eprintln!("{:#?}", error);
            EXIT_FAILURE
        }
        Err(error) => report(&error, &mut io::stderr()),
    }
}
