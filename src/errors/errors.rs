use std::fmt::Display;

use thiserror::Error;

use crate::{ast::ast::StmtType, Position};

/// A failure with the source position it was raised at.
///
/// Once an error crosses a statement boundary it also records the kind of the
/// offending statement; such errors are never wrapped a second time.
#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
    statement: Option<StmtType>,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
            statement: None,
        }
    }

    /// Attaches the offending statement, unless one is already attached.
    pub fn at_statement(self, statement: StmtType, position: &Position) -> Self {
        if self.is_statement_error() {
            return self;
        }

        Error {
            internal_error: self.internal_error,
            position: position.clone(),
            statement: Some(statement),
        }
    }

    pub fn is_statement_error(&self) -> bool {
        self.statement.is_some()
    }

    pub fn get_statement(&self) -> Option<&StmtType> {
        self.statement.as_ref()
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_line(&self) -> u32 {
        self.position.line
    }

    pub fn get_internal(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::FatalEngineError
    }

    pub fn kind(&self) -> ErrorKind {
        self.internal_error.kind()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::ConstReassignment { .. } => "ConstReassignment",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::NotAType { .. } => "NotAType",
            ErrorImpl::UnexpectedStatement { .. } => "UnexpectedStatement",
            ErrorImpl::ModuleNotFound { .. } => "ModuleNotFound",
            ErrorImpl::ImportNotFound { .. } => "ImportNotFound",
            ErrorImpl::CircularImport { .. } => "CircularImport",
            ErrorImpl::ModuleFailed { .. } => "ModuleFailed",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::InvalidOperation { .. } => "InvalidOperation",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::IntegerOverflow => "IntegerOverflow",
            ErrorImpl::IndexOutOfRange { .. } => "IndexOutOfRange",
            ErrorImpl::NotIndexable { .. } => "NotIndexable",
            ErrorImpl::CallDepthExceeded { .. } => "CallDepthExceeded",
            ErrorImpl::Panic { .. } => "Panic",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

/// Errors raised without a known position pick one up at the statement
/// boundary that catches them.
impl From<ErrorImpl> for Error {
    fn from(error_impl: ErrorImpl) -> Self {
        Error::new(error_impl, Position::null())
    }
}

/// The error taxonomy surfaced to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    NameError,
    ConstViolationError,
    TypeMismatchError,
    UnexpectedStatementError,
    ImportError,
    RuntimeError,
    FatalEngineError,
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("variable {variable:?} is not defined")]
    VariableNotDeclared { variable: String },
    #[error("constant variable {variable:?} cannot be reassigned")]
    ConstReassignment { variable: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMatchError { expected: String, received: String },
    #[error("argument {argument:?} types do not match: expected {expected:?}, received {received:?}")]
    ArgumentTypeMatchError {
        argument: String,
        expected: String,
        received: String,
    },
    #[error("{name:?} is not a type")]
    NotAType { name: String },
    #[error("unexpected {statement:?} statement")]
    UnexpectedStatement { statement: StmtType },
    #[error("module {module:?} does not exist")]
    ModuleNotFound { module: String },
    #[error("failed to import {name:?} from {module:?}")]
    ImportNotFound { name: String, module: String },
    #[error("circular import of module {module:?}")]
    CircularImport { module: String },
    #[error("failed to load module {module:?}: {message}")]
    ModuleFailed { module: String, message: String },
    #[error("unexpected arguments: expected {expected:?}, received {received:?}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected:?}, received {received:?}")]
    MissingArguments { expected: usize, received: usize },
    #[error("{value} is not callable")]
    NotCallable { value: String },
    #[error("unsupported operand types for {operator}: {left:?} and {right:?}")]
    InvalidOperation {
        operator: String,
        left: String,
        right: String,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    IntegerOverflow,
    #[error("index {index} out of range for length {length}")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("{type_:?} is not indexable")]
    NotIndexable { type_: String },
    #[error("maximum call depth of {limit} exceeded")]
    CallDepthExceeded { limit: usize },
    #[error("{message}")]
    Panic { message: String },
}

impl ErrorImpl {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. } => ErrorKind::SyntaxError,
            ErrorImpl::VariableNotDeclared { .. } => ErrorKind::NameError,
            ErrorImpl::ConstReassignment { .. } => ErrorKind::ConstViolationError,
            ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::ArgumentTypeMatchError { .. }
            | ErrorImpl::NotAType { .. } => ErrorKind::TypeMismatchError,
            ErrorImpl::UnexpectedStatement { .. } => ErrorKind::UnexpectedStatementError,
            ErrorImpl::ModuleNotFound { .. }
            | ErrorImpl::ImportNotFound { .. }
            | ErrorImpl::CircularImport { .. }
            | ErrorImpl::ModuleFailed { .. } => ErrorKind::ImportError,
            ErrorImpl::Panic { .. } => ErrorKind::FatalEngineError,
            _ => ErrorKind::RuntimeError,
        }
    }
}
