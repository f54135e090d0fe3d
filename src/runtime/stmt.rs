//! Statement dispatch.
//!
//! Module bodies accept imports, declarations, reassignments and function
//! declarations. Function bodies accept declarations, reassignments,
//! returns, bare expressions and `if`/`while`. Any other statement is an
//! `UnexpectedStatement` error.

use std::rc::Rc;

use tracing::trace;

use crate::{
    ast::{
        ast::{Identifier, Stmt, StmtType, StmtWrapper, Type, TypeType, TypeWrapper},
        statements::{BlockStmt, ExpressionStmt, FnDeclStmt, IfStmt, ImportStmt, ReassignmentStmt, ReturnStmt, VarDeclStmt, WhileStmt},
        types::{ArrayType, SymbolType},
    },
    errors::errors::{Error, ErrorImpl},
};

use super::{
    expr::{eval_condition, eval_expr},
    imports::exec_import,
    objects::{DeclaredType, FunctionValue, Value},
    runner::{CallFrame, Runner},
};

pub fn exec_module_body(runner: &mut Runner, body: &BlockStmt) -> Result<(), Error> {
    for stmt in body.iter() {
        exec_module_stmt(runner, stmt).map_err(|error| runner.wrap_error(error, stmt))?;
    }
    Ok(())
}

fn exec_module_stmt(runner: &mut Runner, stmt: &StmtWrapper) -> Result<(), Error> {
    trace!(kind = ?stmt.get_stmt_type(), line = stmt.get_span().start.line, "module statement");

    match stmt.get_stmt_type() {
        StmtType::ImportStmt => exec_import(runner, downcast::<ImportStmt>(stmt)?),
        StmtType::VarDeclStmt => exec_declaration(runner, downcast::<VarDeclStmt>(stmt)?),
        StmtType::ReassignmentStmt => exec_reassignment(runner, downcast::<ReassignmentStmt>(stmt)?),
        StmtType::FnDeclStmt => exec_fn_decl(runner, downcast::<FnDeclStmt>(stmt)?),
        statement => Err(ErrorImpl::UnexpectedStatement { statement }.into()),
    }
}

/// Runs a function body, stopping as soon as the frame has returned.
pub fn exec_function_body(runner: &mut Runner, body: &BlockStmt, frame: &mut CallFrame) -> Result<(), Error> {
    for stmt in body.iter() {
        if frame.returned {
            break;
        }
        exec_function_stmt(runner, stmt, frame).map_err(|error| runner.wrap_error(error, stmt))?;
    }
    Ok(())
}

fn exec_function_stmt(runner: &mut Runner, stmt: &StmtWrapper, frame: &mut CallFrame) -> Result<(), Error> {
    trace!(kind = ?stmt.get_stmt_type(), line = stmt.get_span().start.line, "function statement");

    match stmt.get_stmt_type() {
        StmtType::VarDeclStmt => exec_declaration(runner, downcast::<VarDeclStmt>(stmt)?),
        StmtType::ReassignmentStmt => exec_reassignment(runner, downcast::<ReassignmentStmt>(stmt)?),
        StmtType::ReturnStmt => exec_return(runner, downcast::<ReturnStmt>(stmt)?, frame),
        StmtType::ExpressionStmt => {
            eval_expr(runner, &downcast::<ExpressionStmt>(stmt)?.expression)?;
            Ok(())
        }
        StmtType::IfStmt => exec_if(runner, downcast::<IfStmt>(stmt)?, frame),
        StmtType::WhileStmt => exec_while(runner, downcast::<WhileStmt>(stmt)?, frame),
        statement => Err(ErrorImpl::UnexpectedStatement { statement }.into()),
    }
}

fn downcast<T: 'static>(stmt: &StmtWrapper) -> Result<&T, Error> {
    stmt.as_any().downcast_ref::<T>().ok_or_else(|| {
        ErrorImpl::Panic {
            message: format!("malformed {:?} node", stmt.get_stmt_type()),
        }
        .into()
    })
}

fn exec_declaration(runner: &mut Runner, stmt: &VarDeclStmt) -> Result<(), Error> {
    let value = eval_expr(runner, &stmt.assigned_value)?.promote();

    if let Some(annotation) = &stmt.explicit_type {
        resolve_annotation(runner, annotation)?.type_check(&value)?;
    }

    let target = if stmt.is_global { runner.global } else { runner.active };
    runner
        .environments
        .declare(target, stmt.identifier.clone(), value, stmt.is_constant)?;
    Ok(())
}

fn exec_reassignment(runner: &mut Runner, stmt: &ReassignmentStmt) -> Result<(), Error> {
    let value = eval_expr(runner, &stmt.value)?;
    let scope = runner.active;
    runner.environments.reassign(scope, &stmt.identifier, value)?;
    Ok(())
}

fn exec_fn_decl(runner: &mut Runner, stmt: &FnDeclStmt) -> Result<(), Error> {
    let mut parameters = Vec::with_capacity(stmt.parameters.len());
    for (name, annotation) in stmt.parameters.iter() {
        let resolved = match annotation {
            Some(annotation) => Some(resolve_annotation(runner, annotation)?),
            None => None,
        };
        parameters.push((name.clone(), resolved));
    }

    let return_type = match &stmt.return_type {
        Some(annotation) => Some(resolve_annotation(runner, annotation)?),
        None => None,
    };

    let function = FunctionValue::new(
        stmt.identifier.name.clone(),
        parameters,
        return_type,
        stmt.body.clone(),
        stmt.get_span().start.clone(),
    );

    let scope = runner.active;
    runner
        .environments
        .declare(scope, stmt.identifier.clone(), Value::Function(Rc::new(function)), false)?;
    Ok(())
}

fn exec_return(runner: &mut Runner, stmt: &ReturnStmt, frame: &mut CallFrame) -> Result<(), Error> {
    let value = match &stmt.value {
        Some(expr) => eval_expr(runner, expr)?.promote(),
        None => Value::Void,
    };

    match frame.function.enforced_return_type() {
        Some(expected) => expected.type_check(&value)?,
        None => frame.function.record_inferred(DeclaredType::of(&value)),
    }

    frame.value = value;
    frame.returned = true;
    Ok(())
}

fn exec_if(runner: &mut Runner, stmt: &IfStmt, frame: &mut CallFrame) -> Result<(), Error> {
    if eval_condition(runner, &stmt.condition)? {
        return exec_block(runner, &stmt.then_body, frame);
    }

    match &stmt.else_body {
        Some(else_body) => match else_body.get_stmt_type() {
            StmtType::IfStmt => exec_if(runner, downcast::<IfStmt>(else_body)?, frame),
            _ => exec_block(runner, downcast::<BlockStmt>(else_body)?, frame),
        },
        None => Ok(()),
    }
}

fn exec_while(runner: &mut Runner, stmt: &WhileStmt, frame: &mut CallFrame) -> Result<(), Error> {
    while !frame.returned && eval_condition(runner, &stmt.condition)? {
        exec_block(runner, &stmt.body, frame)?;
    }
    Ok(())
}

/// Runs a control-flow block in a child of the active environment.
fn exec_block(runner: &mut Runner, block: &BlockStmt, frame: &mut CallFrame) -> Result<(), Error> {
    let parent = runner.active;
    runner.with_scope(parent, |runner| exec_function_body(runner, block, frame))
}

/// Resolves an annotation against the names visible from the active
/// environment.
pub fn resolve_annotation(runner: &Runner, annotation: &TypeWrapper) -> Result<DeclaredType, Error> {
    match annotation.get_type_type() {
        TypeType::Symbol(name) => {
            let not_a_type = || ErrorImpl::NotAType { name: name.clone() };
            let line = annotation
                .as_any()
                .downcast_ref::<SymbolType>()
                .map(|symbol| symbol.position.line)
                .unwrap_or(0);

            match runner.environments.lookup(runner.active, &Identifier::new(name.clone(), line)) {
                Ok(Value::Type(tag)) => Ok(DeclaredType::Tag(tag)),
                _ => Err(not_a_type().into()),
            }
        }
        TypeType::Array(_) => {
            let array = annotation.as_any().downcast_ref::<ArrayType>().ok_or_else(|| ErrorImpl::Panic {
                message: String::from("malformed list annotation"),
            })?;
            Ok(DeclaredType::ListOf(Box::new(resolve_annotation(runner, &array.underlying)?)))
        }
    }
}
