use crate::{
    ast::{
        ast::{Expr, ExprType, ExprWrapper, Identifier},
        expressions::{BinaryExpr, BooleanExpr, CallExpr, IndexExpr, ListExpr, NumberExpr, PrefixExpr, StringExpr, SymbolExpr},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{objects::{TypeTag, Value}, runner::Runner, stack::ensure_sufficient_stack};

/// Evaluates `expr`. Every nested evaluation, calls included, passes through
/// here, so this is where the host stack is grown.
pub fn eval_expr(runner: &mut Runner, expr: &ExprWrapper) -> Result<Value, Error> {
    ensure_sufficient_stack(|| eval_expr_inner(runner, expr))
}

fn eval_expr_inner(runner: &mut Runner, expr: &ExprWrapper) -> Result<Value, Error> {
    match expr.get_expr_type() {
        ExprType::Number => Ok(Value::Integer(downcast::<NumberExpr>(expr)?.value)),
        ExprType::String => Ok(Value::String(downcast::<StringExpr>(expr)?.value.clone())),
        ExprType::Boolean => Ok(Value::Boolean(downcast::<BooleanExpr>(expr)?.value)),
        ExprType::Symbol => {
            let symbol = downcast::<SymbolExpr>(expr)?;
            let identifier = Identifier::new(symbol.value.clone(), symbol.span.start.line);
            Ok(runner.environments.lookup(runner.active, &identifier)?)
        }
        ExprType::List => {
            let list = downcast::<ListExpr>(expr)?;
            let mut items = Vec::with_capacity(list.elements.len());
            for element in list.elements.iter() {
                items.push(eval_expr(runner, element)?.promote());
            }
            Ok(Value::list(items))
        }
        ExprType::Binary => eval_binary(runner, downcast::<BinaryExpr>(expr)?),
        ExprType::Prefix => eval_prefix(runner, downcast::<PrefixExpr>(expr)?),
        ExprType::CallExpr => {
            let call = downcast::<CallExpr>(expr)?;
            let callee = eval_expr(runner, &call.callee)?;

            let mut arguments = Vec::with_capacity(call.arguments.len());
            for argument in call.arguments.iter() {
                arguments.push(eval_expr(runner, argument)?.promote());
            }

            runner.call_value(&callee, arguments)
        }
        ExprType::Index => eval_index(runner, downcast::<IndexExpr>(expr)?),
    }
}

/// Evaluates a condition, which must be a `Boolean`.
pub fn eval_condition(runner: &mut Runner, expr: &ExprWrapper) -> Result<bool, Error> {
    match eval_expr(runner, expr)?.promote() {
        Value::Boolean(value) => Ok(value),
        other => Err(ErrorImpl::TypeMatchError {
            expected: TypeTag::Boolean.to_string(),
            received: other.type_tag().to_string(),
        }
        .into()),
    }
}

fn downcast<T: 'static>(expr: &ExprWrapper) -> Result<&T, Error> {
    expr.as_any().downcast_ref::<T>().ok_or_else(|| {
        ErrorImpl::Panic {
            message: format!("malformed {:?} expression", expr.get_expr_type()),
        }
        .into()
    })
}

fn invalid_operation(operator: &str, left: &Value, right: &Value) -> ErrorImpl {
    ErrorImpl::InvalidOperation {
        operator: operator.to_string(),
        left: left.type_tag().to_string(),
        right: right.type_tag().to_string(),
    }
}

fn eval_binary(runner: &mut Runner, expr: &BinaryExpr) -> Result<Value, Error> {
    let operator = expr.operator.kind;

    // Logical operators short-circuit.
    if operator == TokenKind::And || operator == TokenKind::Or {
        let left = eval_condition(runner, &expr.left)?;
        if (operator == TokenKind::And && !left) || (operator == TokenKind::Or && left) {
            return Ok(Value::Boolean(left));
        }
        return Ok(Value::Boolean(eval_condition(runner, &expr.right)?));
    }

    let left = eval_expr(runner, &expr.left)?.promote();
    let right = eval_expr(runner, &expr.right)?.promote();
    let symbol = expr.operator.value.as_str();

    let value = match (operator, &left, &right) {
        (TokenKind::Equals, _, _) => Value::Boolean(left.equals(&right)),
        (TokenKind::NotEquals, _, _) => Value::Boolean(!left.equals(&right)),

        (TokenKind::Plus, Value::Integer(a), Value::Integer(b)) => Value::Integer(a.checked_add(*b).ok_or(ErrorImpl::IntegerOverflow)?),
        (TokenKind::Dash, Value::Integer(a), Value::Integer(b)) => Value::Integer(a.checked_sub(*b).ok_or(ErrorImpl::IntegerOverflow)?),
        (TokenKind::Star, Value::Integer(a), Value::Integer(b)) => Value::Integer(a.checked_mul(*b).ok_or(ErrorImpl::IntegerOverflow)?),
        (TokenKind::Slash | TokenKind::Percent, Value::Integer(_), Value::Integer(0)) => return Err(ErrorImpl::DivisionByZero.into()),
        (TokenKind::Slash, Value::Integer(a), Value::Integer(b)) => Value::Integer(a.checked_div(*b).ok_or(ErrorImpl::IntegerOverflow)?),
        (TokenKind::Percent, Value::Integer(a), Value::Integer(b)) => Value::Integer(a.checked_rem(*b).ok_or(ErrorImpl::IntegerOverflow)?),

        (TokenKind::Plus, Value::String(a), Value::String(b)) => Value::String(format!("{}{}", a, b)),
        (TokenKind::Plus, Value::List(a), Value::List(b)) => {
            Value::list(a.iter().chain(b.iter()).cloned().collect())
        }

        (TokenKind::Less, Value::Integer(a), Value::Integer(b)) => Value::Boolean(a < b),
        (TokenKind::LessEquals, Value::Integer(a), Value::Integer(b)) => Value::Boolean(a <= b),
        (TokenKind::Greater, Value::Integer(a), Value::Integer(b)) => Value::Boolean(a > b),
        (TokenKind::GreaterEquals, Value::Integer(a), Value::Integer(b)) => Value::Boolean(a >= b),
        (TokenKind::Less, Value::String(a), Value::String(b)) => Value::Boolean(a < b),
        (TokenKind::LessEquals, Value::String(a), Value::String(b)) => Value::Boolean(a <= b),
        (TokenKind::Greater, Value::String(a), Value::String(b)) => Value::Boolean(a > b),
        (TokenKind::GreaterEquals, Value::String(a), Value::String(b)) => Value::Boolean(a >= b),

        _ => return Err(invalid_operation(symbol, &left, &right).into()),
    };

    Ok(value)
}

fn eval_prefix(runner: &mut Runner, expr: &PrefixExpr) -> Result<Value, Error> {
    let operand = eval_expr(runner, &expr.right_expr)?.promote();

    match (expr.operator.kind, &operand) {
        (TokenKind::Dash, Value::Integer(value)) => Ok(Value::Integer(value.checked_neg().ok_or(ErrorImpl::IntegerOverflow)?)),
        (TokenKind::Not, Value::Boolean(value)) => Ok(Value::Boolean(!value)),
        _ => Err(ErrorImpl::InvalidOperation {
            operator: expr.operator.value.clone(),
            left: String::from("nothing"),
            right: operand.type_tag().to_string(),
        }
        .into()),
    }
}

fn eval_index(runner: &mut Runner, expr: &IndexExpr) -> Result<Value, Error> {
    let target = eval_expr(runner, &expr.target)?.promote();
    let index = match eval_expr(runner, &expr.index)?.promote() {
        Value::Integer(index) => index,
        other => {
            return Err(ErrorImpl::TypeMatchError {
                expected: TypeTag::Integer.to_string(),
                received: other.type_tag().to_string(),
            }
            .into())
        }
    };

    match &target {
        Value::List(items) => element_at(items.len(), index)
            .map(|position| items[position].clone())
            .ok_or_else(|| ErrorImpl::IndexOutOfRange { index, length: items.len() }.into()),
        Value::String(text) => {
            let length = text.chars().count();
            element_at(length, index)
                .and_then(|position| text.chars().nth(position))
                .map(|character| Value::String(character.to_string()))
                .ok_or_else(|| ErrorImpl::IndexOutOfRange { index, length }.into())
        }
        other => Err(ErrorImpl::NotIndexable {
            type_: other.type_tag().to_string(),
        }
        .into()),
    }
}

fn element_at(length: usize, index: i64) -> Option<usize> {
    usize::try_from(index).ok().filter(|position| *position < length)
}

