//! The host standard library.
//!
//! Modules are registered under their dotted path (`std.io`) and export
//! values by name. Hosts may register further modules on top of the defaults.

use std::{collections::HashMap, io::Write};

use crate::errors::errors::ErrorImpl;

use super::objects::{HostLiteral, NativeFn, NativeFunction, TypeTag, Value};

pub type StdModule = HashMap<&'static str, Value>;

#[derive(Debug)]
pub struct StdLib {
    modules: HashMap<String, StdModule>,
}

impl StdLib {
    /// A standard library with no modules at all.
    pub fn empty() -> Self {
        StdLib {
            modules: HashMap::new(),
        }
    }

    pub fn register(&mut self, path: impl Into<String>, exports: StdModule) {
        self.modules.insert(path.into(), exports);
    }

    pub fn module(&self, path: &str) -> Option<&StdModule> {
        self.modules.get(path)
    }
}

impl Default for StdLib {
    fn default() -> Self {
        let mut stdlib = StdLib::empty();
        stdlib.register("std.io", exports(&[("print", print as NativeFn)]));
        stdlib.register(
            "std.list",
            exports(&[
                ("len", list_len as NativeFn),
                ("push", list_push as NativeFn),
                ("range", list_range as NativeFn),
            ]),
        );
        stdlib.register(
            "std.string",
            exports(&[
                ("len", string_len as NativeFn),
                ("to_string", to_string as NativeFn),
                ("upper", upper as NativeFn),
            ]),
        );

        let mut sys = StdModule::new();
        sys.insert("VERSION", Value::Thin(HostLiteral::String(env!("CARGO_PKG_VERSION").to_string())));
        stdlib.register("std.sys", sys);

        stdlib
    }
}

fn exports(functions: &[(&'static str, NativeFn)]) -> StdModule {
    functions
        .iter()
        .map(|(name, call)| (*name, Value::Native(NativeFunction { name: *name, call: *call })))
        .collect()
}

fn expect_arity(arguments: &[Value], expected: usize) -> Result<(), ErrorImpl> {
    let received = arguments.len();
    if received > expected {
        Err(ErrorImpl::UnexpectedArguments { expected, received })
    } else if received < expected {
        Err(ErrorImpl::MissingArguments { expected, received })
    } else {
        Ok(())
    }
}

fn argument_mismatch(argument: &str, expected: TypeTag, received: &Value) -> ErrorImpl {
    ErrorImpl::ArgumentTypeMatchError {
        argument: argument.to_string(),
        expected: expected.to_string(),
        received: received.type_tag().to_string(),
    }
}

fn print(output: &mut dyn Write, arguments: Vec<Value>) -> Result<Value, ErrorImpl> {
    let line = arguments
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    writeln!(output, "{}", line).map_err(|error| ErrorImpl::Panic {
        message: format!("failed to write output: {}", error),
    })?;
    Ok(Value::Void)
}

fn list_len(_: &mut dyn Write, arguments: Vec<Value>) -> Result<Value, ErrorImpl> {
    expect_arity(&arguments, 1)?;
    match &arguments[0] {
        Value::List(items) => Ok(Value::Integer(items.len() as i64)),
        other => Err(argument_mismatch("list", TypeTag::List, other)),
    }
}

fn list_push(_: &mut dyn Write, arguments: Vec<Value>) -> Result<Value, ErrorImpl> {
    expect_arity(&arguments, 2)?;
    match &arguments[0] {
        Value::List(items) => {
            let mut pushed = items.as_ref().clone();
            pushed.push(arguments[1].clone());
            Ok(Value::list(pushed))
        }
        other => Err(argument_mismatch("list", TypeTag::List, other)),
    }
}

fn list_range(_: &mut dyn Write, arguments: Vec<Value>) -> Result<Value, ErrorImpl> {
    expect_arity(&arguments, 1)?;
    match &arguments[0] {
        Value::Integer(end) => Ok(Value::list((0..*end).map(Value::Integer).collect())),
        other => Err(argument_mismatch("end", TypeTag::Integer, other)),
    }
}

fn string_len(_: &mut dyn Write, arguments: Vec<Value>) -> Result<Value, ErrorImpl> {
    expect_arity(&arguments, 1)?;
    match &arguments[0] {
        Value::String(text) => Ok(Value::Integer(text.chars().count() as i64)),
        other => Err(argument_mismatch("string", TypeTag::String, other)),
    }
}

fn to_string(_: &mut dyn Write, arguments: Vec<Value>) -> Result<Value, ErrorImpl> {
    expect_arity(&arguments, 1)?;
    Ok(Value::String(arguments[0].to_string()))
}

fn upper(_: &mut dyn Write, arguments: Vec<Value>) -> Result<Value, ErrorImpl> {
    expect_arity(&arguments, 1)?;
    match &arguments[0] {
        Value::String(text) => Ok(Value::String(text.to_uppercase())),
        other => Err(argument_mismatch("string", TypeTag::String, other)),
    }
}
