//! The execution engine: scope management and the call engine.
//!
//! A [`Runner`] owns the environment arena for one program (or one imported
//! module). Statement dispatch lives in [`super::stmt`], expression evaluation
//! in [`super::expr`].

use std::{
    cell::RefCell,
    fs,
    io::Write,
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::{debug, instrument};

use crate::{
    ast::{
        ast::{Identifier, Stmt},
        statements::BlockStmt,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

use super::{
    driver::RunOptions,
    environment::{EnvId, Environments},
    objects::{FunctionValue, NativeFunction, Value},
    stdlib::StdLib,
    stmt::{exec_function_body, exec_module_body},
};

/// Per-invocation state of a user function.
#[derive(Debug)]
pub struct CallFrame {
    pub returned: bool,
    pub value: Value,
    /// The function being run. Its declared or inferred return type is
    /// consulted by every `return`, and the first executed `return` of an
    /// unannotated function fixes the inferred type for all activations.
    pub function: Rc<FunctionValue>,
}

impl CallFrame {
    pub fn new(function: Rc<FunctionValue>) -> Self {
        CallFrame {
            returned: false,
            value: Value::Void,
            function,
        }
    }
}

pub struct Runner {
    pub(crate) debug: bool,
    pub(crate) max_depth: usize,
    pub(crate) environments: Environments,
    pub(crate) global: EnvId,
    pub(crate) active: EnvId,
    pub(crate) file: Rc<String>,
    pub(crate) stdlib: Rc<StdLib>,
    pub(crate) output: Rc<RefCell<dyn Write>>,
    depth: usize,
    /// Canonical paths of the files being loaded, outermost first. Shared
    /// with nested runners so circular imports can be detected.
    pub(crate) loading: Rc<RefCell<Vec<PathBuf>>>,
}

impl Runner {
    pub fn new(file: impl Into<String>, options: &RunOptions, stdlib: Rc<StdLib>, output: Rc<RefCell<dyn Write>>) -> Self {
        let file = Rc::new(file.into());
        let mut loading = vec![];
        if let Ok(path) = Path::new(file.as_str()).canonicalize() {
            loading.push(path);
        }

        Runner::with_loading(file, options, stdlib, output, Rc::new(RefCell::new(loading)))
    }

    fn with_loading(
        file: Rc<String>,
        options: &RunOptions,
        stdlib: Rc<StdLib>,
        output: Rc<RefCell<dyn Write>>,
        loading: Rc<RefCell<Vec<PathBuf>>>,
    ) -> Self {
        let mut environments = Environments::new();
        let global = environments.create(None);

        Runner {
            debug: options.debug,
            max_depth: options.max_depth,
            environments,
            global,
            active: global,
            file,
            stdlib,
            output,
            depth: 0,
            loading,
        }
    }

    /// A runner for an imported file, sharing this runner's standard
    /// library, output sink and import chain.
    pub fn nested(&self, file: impl Into<String>) -> Runner {
        let options = RunOptions {
            debug: self.debug,
            max_depth: self.max_depth,
        };
        Runner::with_loading(
            Rc::new(file.into()),
            &options,
            Rc::clone(&self.stdlib),
            Rc::clone(&self.output),
            Rc::clone(&self.loading),
        )
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn global_env(&self) -> EnvId {
        self.global
    }

    pub fn active_env(&self) -> EnvId {
        self.active
    }

    pub fn environments(&self) -> &Environments {
        &self.environments
    }

    /// Looks `name` up from the active environment.
    pub fn lookup(&self, name: &str) -> Result<Value, ErrorImpl> {
        self.environments.lookup(self.active, &Identifier::synthetic(name))
    }

    /// Looks `name` up in the root environment.
    pub fn lookup_global(&self, name: &str) -> Result<Value, ErrorImpl> {
        self.environments.lookup(self.global, &Identifier::synthetic(name))
    }

    /// Tokenizes and parses `source`. A lexical error is reported alone;
    /// syntax errors are all collected.
    pub fn parse_module(&self, source: String) -> Result<BlockStmt, Vec<Error>> {
        let tokens = tokenize(source, Some(self.file.to_string())).map_err(|error| vec![error])?;
        parse(tokens, Rc::clone(&self.file))
    }

    /// Runs the top level of a parsed module against the root environment.
    pub fn run_module(&mut self, ast: &BlockStmt) -> Result<(), Error> {
        debug!(file = %self.file, statements = ast.body.len(), "running module");
        exec_module_body(self, ast)
    }

    /// Parses and runs `source`, failing with its first syntax error.
    pub fn run_module_source(&mut self, source: String) -> Result<(), Error> {
        let ast = self.parse_module(source).map_err(|errors| {
            errors.into_iter().next().unwrap_or_else(|| {
                ErrorImpl::Panic {
                    message: String::from("parsing failed without an error"),
                }
                .into()
            })
        })?;
        self.run_module(&ast)
    }

    pub fn run_module_file(&mut self, path: &Path) -> Result<(), Error> {
        let source = fs::read_to_string(path).map_err(|error| ErrorImpl::ModuleFailed {
            module: path.display().to_string(),
            message: error.to_string(),
        })?;
        self.run_module_source(source)
    }

    /// Attaches the statement an error escaped from. Debug mode keeps errors raw.
    pub(crate) fn wrap_error(&self, error: Error, stmt: &dyn Stmt) -> Error {
        if self.debug {
            error
        } else {
            error.at_statement(stmt.get_stmt_type(), &stmt.get_span().start)
        }
    }

    /// Runs `f` in a fresh child of `parent`, restoring the active
    /// environment and releasing the child afterwards, whatever the outcome.
    pub fn with_scope<T>(&mut self, parent: EnvId, f: impl FnOnce(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        let scope = self.environments.create(Some(parent));
        let previous = std::mem::replace(&mut self.active, scope);

        let result = f(self);

        self.active = previous;
        self.environments.release(scope);
        result
    }

    /// Calls any callable value with already evaluated arguments.
    pub fn call_value(&mut self, callee: &Value, arguments: Vec<Value>) -> Result<Value, Error> {
        match callee {
            Value::Function(function) => self.call_function(function, arguments),
            Value::Native(native) => self.call_native(native, arguments),
            other => Err(ErrorImpl::NotCallable {
                value: other.to_string(),
            }
            .into()),
        }
    }

    pub fn call_native(&mut self, native: &NativeFunction, arguments: Vec<Value>) -> Result<Value, Error> {
        let mut output = self.output.borrow_mut();
        Ok((native.call)(&mut *output, arguments)?)
    }

    /// Invokes a user function.
    ///
    /// The new environment is parented to the caller's active environment, so
    /// free names in the body resolve at the call site.
    #[instrument(level = "debug", skip_all, fields(function = %function.name, depth = self.depth))]
    pub fn call_function(&mut self, function: &Rc<FunctionValue>, arguments: Vec<Value>) -> Result<Value, Error> {
        let expected = function.parameters.len();
        let received = arguments.len();
        if received > expected {
            return Err(ErrorImpl::UnexpectedArguments { expected, received }.into());
        }
        if received < expected {
            return Err(ErrorImpl::MissingArguments { expected, received }.into());
        }

        for ((name, annotation), argument) in function.parameters.iter().zip(arguments.iter()) {
            if let Some(annotation) = annotation {
                annotation.type_check(argument).map_err(|_| ErrorImpl::ArgumentTypeMatchError {
                    argument: name.name.clone(),
                    expected: annotation.to_string(),
                    received: argument.type_tag().to_string(),
                })?;
            }
        }

        if self.depth >= self.max_depth {
            return Err(ErrorImpl::CallDepthExceeded { limit: self.max_depth }.into());
        }

        self.depth += 1;
        let caller = self.active;
        let result = self.with_scope(caller, |runner| {
            let scope = runner.active;
            for ((name, _), argument) in function.parameters.iter().zip(arguments) {
                runner.environments.bind_parameter(scope, name.clone(), argument)?;
            }

            let mut frame = CallFrame::new(Rc::clone(function));
            exec_function_body(runner, &function.body, &mut frame)?;
            Ok(frame)
        });
        self.depth -= 1;

        let frame = result?;

        if !frame.returned {
            if let Some(declared) = &function.return_type {
                declared.type_check(&Value::Void)?;
            }
        }

        debug!(returned = %frame.value, "call finished");
        Ok(frame.value)
    }
}
