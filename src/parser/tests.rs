//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Variable declarations (local, const, global, annotated)
//! - Reassignment and compound assignment
//! - Imports and function declarations
//! - Expressions and precedence
//! - Control flow statements
//! - Syntax errors

use std::rc::Rc;

use crate::{
    ast::{
        ast::{Expr, ExprType, Stmt, StmtType, Type, TypeType},
        expressions::{BinaryExpr, CallExpr, NumberExpr},
        statements::{BlockStmt, ExpressionStmt, FnDeclStmt, IfStmt, ImportStmt, ReassignmentStmt, VarDeclStmt},
    },
    errors::errors::{Error, ErrorKind},
    lexer::{lexer::tokenize, tokens::TokenKind},
};

use super::parser::parse;

fn parse_source(source: &str) -> Result<BlockStmt, Error> {
    parse_all(source).map_err(|errors| errors.into_iter().next().unwrap())
}

fn parse_all(source: &str) -> Result<BlockStmt, Vec<Error>> {
    let tokens = tokenize(source.to_string(), Some("test.vi".to_string())).unwrap();
    parse(tokens, Rc::new("test.vi".to_string()))
}

fn error_lines(source: &str) -> Vec<u32> {
    parse_all(source)
        .err()
        .unwrap()
        .iter()
        .map(|error| error.get_line())
        .collect()
}

#[test]
fn test_parse_variable_declaration() {
    let block = parse_source("let x = 42;").unwrap();

    assert_eq!(block.body.len(), 1);
    let decl = block.body[0].as_any().downcast_ref::<VarDeclStmt>().unwrap();
    assert_eq!(decl.identifier.name, "x");
    assert!(!decl.is_constant);
    assert!(!decl.is_global);
    assert!(decl.explicit_type.is_none());
    assert_eq!(decl.assigned_value.get_expr_type(), ExprType::Number);
}

#[test]
fn test_parse_const_declaration_with_type() {
    let block = parse_source("const names: String[] = [\"a\", \"b\"];").unwrap();

    let decl = block.body[0].as_any().downcast_ref::<VarDeclStmt>().unwrap();
    assert!(decl.is_constant);
    assert_eq!(
        decl.explicit_type.as_ref().unwrap().get_type_type(),
        TypeType::Array(Box::new(TypeType::Symbol("String".to_string())))
    );
    assert_eq!(decl.assigned_value.get_expr_type(), ExprType::List);
}

#[test]
fn test_parse_global_declaration() {
    let block = parse_source("global const LIMIT = 10;").unwrap();

    let decl = block.body[0].as_any().downcast_ref::<VarDeclStmt>().unwrap();
    assert!(decl.is_global);
    assert!(decl.is_constant);
    assert_eq!(decl.identifier.name, "LIMIT");
}

#[test]
fn test_parse_global_requires_declaration() {
    let error = parse_source("global x = 1;").err().unwrap();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_declaration_requires_value() {
    let error = parse_source("let x: Integer;").err().unwrap();
    assert_eq!(error.kind(), ErrorKind::SyntaxError);
}

#[test]
fn test_parse_function_declaration() {
    let block = parse_source("fn add(a: Integer, b) -> Integer { return a + b; }").unwrap();

    let decl = block.body[0].as_any().downcast_ref::<FnDeclStmt>().unwrap();
    assert_eq!(decl.identifier.name, "add");
    assert_eq!(decl.parameters.len(), 2);
    assert!(decl.parameters[0].1.is_some());
    assert!(decl.parameters[1].1.is_none());
    assert!(decl.return_type.is_some());
    assert_eq!(decl.body.body[0].get_stmt_type(), StmtType::ReturnStmt);
}

#[test]
fn test_parse_import_statement() {
    let block = parse_source("import print, len from std.io;").unwrap();

    let import = block.body[0].as_any().downcast_ref::<ImportStmt>().unwrap();
    let names: Vec<&str> = import.names.iter().map(|name| name.name.as_str()).collect();
    assert_eq!(names, vec!["print", "len"]);
    assert_eq!(import.module_name(), "std.io");
    assert!(import.is_std());
}

#[test]
fn test_parse_local_import() {
    let block = parse_source("import helper from lib.utils;").unwrap();

    let import = block.body[0].as_any().downcast_ref::<ImportStmt>().unwrap();
    assert_eq!(import.module, vec!["lib".to_string(), "utils".to_string()]);
    assert!(!import.is_std());
}

#[test]
fn test_parse_if_else_chain() {
    let block = parse_source("if x > 0 { f(); } else if x < 0 { g(); } else { h(); }").unwrap();

    let stmt = block.body[0].as_any().downcast_ref::<IfStmt>().unwrap();
    assert_eq!(stmt.condition.get_expr_type(), ExprType::Binary);
    let else_if = stmt.else_body.as_ref().unwrap();
    assert_eq!(else_if.get_stmt_type(), StmtType::IfStmt);
    let nested = else_if.as_any().downcast_ref::<IfStmt>().unwrap();
    assert_eq!(nested.else_body.as_ref().unwrap().get_stmt_type(), StmtType::BlockStmt);
}

#[test]
fn test_parse_while_loop() {
    let block = parse_source("while x < 10 { x = x + 1; }").unwrap();
    assert_eq!(block.body[0].get_stmt_type(), StmtType::WhileStmt);
}

#[test]
fn test_parse_assignment() {
    let block = parse_source("x = 42;").unwrap();

    let stmt = block.body[0].as_any().downcast_ref::<ReassignmentStmt>().unwrap();
    assert_eq!(stmt.identifier.name, "x");
    assert_eq!(stmt.value.get_expr_type(), ExprType::Number);
}

#[test]
fn test_parse_compound_assignment() {
    let block = parse_source("x += 5;").unwrap();

    let stmt = block.body[0].as_any().downcast_ref::<ReassignmentStmt>().unwrap();
    let value = stmt.value.as_any().downcast_ref::<BinaryExpr>().unwrap();
    assert_eq!(value.operator.kind, TokenKind::Plus);
    assert_eq!(value.operator.value, "+");
    assert_eq!(value.left.get_expr_type(), ExprType::Symbol);
}

#[test]
fn test_parse_operator_precedence() {
    let block = parse_source("let result = 5 - 3 * 2;").unwrap();

    let decl = block.body[0].as_any().downcast_ref::<VarDeclStmt>().unwrap();
    let sum = decl.assigned_value.as_any().downcast_ref::<BinaryExpr>().unwrap();
    assert_eq!(sum.operator.kind, TokenKind::Dash);
    let product = sum.right.as_any().downcast_ref::<BinaryExpr>().unwrap();
    assert_eq!(product.operator.kind, TokenKind::Star);
}

#[test]
fn test_parse_left_associative() {
    let block = parse_source("let result = 10 - 3 - 2;").unwrap();

    let decl = block.body[0].as_any().downcast_ref::<VarDeclStmt>().unwrap();
    let outer = decl.assigned_value.as_any().downcast_ref::<BinaryExpr>().unwrap();
    assert_eq!(outer.left.get_expr_type(), ExprType::Binary);
    let two = outer.right.as_any().downcast_ref::<NumberExpr>().unwrap();
    assert_eq!(two.value, 2);
}

#[test]
fn test_parse_parenthesized_expression() {
    let block = parse_source("let result = (5 + 3) * 2;").unwrap();

    let decl = block.body[0].as_any().downcast_ref::<VarDeclStmt>().unwrap();
    let product = decl.assigned_value.as_any().downcast_ref::<BinaryExpr>().unwrap();
    assert_eq!(product.operator.kind, TokenKind::Star);
    assert_eq!(product.left.get_expr_type(), ExprType::Binary);
}

#[test]
fn test_parse_unary_binds_tighter_than_binary() {
    let block = parse_source("let neg = -x + 1;").unwrap();

    let decl = block.body[0].as_any().downcast_ref::<VarDeclStmt>().unwrap();
    let sum = decl.assigned_value.as_any().downcast_ref::<BinaryExpr>().unwrap();
    assert_eq!(sum.left.get_expr_type(), ExprType::Prefix);
}

#[test]
fn test_parse_call_and_index() {
    let block = parse_source("print(items[0], len(items));").unwrap();

    let stmt = block.body[0].as_any().downcast_ref::<ExpressionStmt>().unwrap();
    let call = stmt.expression.as_any().downcast_ref::<CallExpr>().unwrap();
    assert_eq!(call.arguments.len(), 2);
    assert_eq!(call.arguments[0].get_expr_type(), ExprType::Index);
    assert_eq!(call.arguments[1].get_expr_type(), ExprType::CallExpr);
}

#[test]
fn test_parse_boolean_literals() {
    let block = parse_source("let flag = !true || false;").unwrap();

    let decl = block.body[0].as_any().downcast_ref::<VarDeclStmt>().unwrap();
    let or = decl.assigned_value.as_any().downcast_ref::<BinaryExpr>().unwrap();
    assert_eq!(or.operator.kind, TokenKind::Or);
    assert_eq!(or.right.get_expr_type(), ExprType::Boolean);
}

#[test]
fn test_parse_identifier_lines() {
    let block = parse_source("let a = 1;\n\nlet b = 2;").unwrap();

    let second = block.body[1].as_any().downcast_ref::<VarDeclStmt>().unwrap();
    assert_eq!(second.identifier.line, 3);
    assert_eq!(second.get_span().start.line, 3);
}

#[test]
fn test_parse_empty_program() {
    let block = parse_source("").unwrap();
    assert!(block.body.is_empty());
}

#[test]
fn test_parse_syntax_error_missing_semicolon() {
    let error = parse_source("let x = 42").err().unwrap();
    assert_eq!(error.get_error_name(), "UnexpectedToken");
}

#[test]
fn test_parse_syntax_error_unexpected_token() {
    let error = parse_source("let = 42;").err().unwrap();
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_syntax_error_reports_line() {
    let error = parse_source("let x = 1;\nlet y = (2 + 3;\n").err().unwrap();
    assert_eq!(error.get_line(), 2);
}

#[test]
fn test_parse_reports_every_broken_statement() {
    assert_eq!(error_lines("let = 1;\nlet x = 2;\nlet y = ;\n"), vec![1, 3]);
}

#[test]
fn test_parse_error_abandons_enclosing_function() {
    let source = "fn f() {\n    let = 1;\n    let ok = 2;\n}\nlet z = ;\nlet w = 1;";
    assert_eq!(error_lines(source), vec![2, 5]);
}

#[test]
fn test_parse_error_recovery_skips_else_branch() {
    let source = "if x {\n    let = 1;\n} else {\n    let y = 2;\n}\nlet = 3;";
    assert_eq!(error_lines(source), vec![2, 6]);
}

#[test]
fn test_parse_stray_closing_brace() {
    assert_eq!(error_lines("}\nlet x = 1;\n}"), vec![1, 3]);
}

#[test]
fn test_parse_unterminated_block() {
    let error = parse_source("fn main() { let x = 1;").err().unwrap();
    assert_eq!(error.kind(), ErrorKind::SyntaxError);
}

#[test]
fn test_parse_number_too_large() {
    let error = parse_source("let x = 99999999999999999999;").err().unwrap();
    assert_eq!(error.get_error_name(), "NumberParseError");
}
