use crate::{ast::{ast::{Expr, ExprWrapper, Identifier, StmtWrapper}, expressions::{BinaryExpr, SymbolExpr}, statements::{BlockStmt, ExpressionStmt, FnDeclStmt, IfStmt, ImportStmt, ReassignmentStmt, ReturnStmt, VarDeclStmt, WhileStmt}}, errors::errors::Error, lexer::tokens::{Token, TokenKind}, parser::{expr::parse_expr, lookups::BindingPower}, Position, Span};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    if let Some(handler) = parser.get_stmt_lookup().get(&parser.current_token_kind()).copied() {
        return handler(parser);
    }

    if parser.current_token_kind() == TokenKind::Identifier {
        let next = parser.peek_kind();
        if next == TokenKind::Assignment || next.compound_operator().is_some() {
            return parse_reassignment_stmt(parser);
        }
    }

    let expr = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;

    Ok(StmtWrapper::new(ExpressionStmt {
        span: expr.get_span().clone(),
        expression: expr,
    }))
}

fn identifier_from(token: &Token) -> Identifier {
    Identifier::new(token.value.clone(), token.span.start.line)
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.get_position();
    parse_var_decl(parser, start, false)
}

/// `global let ...;` / `global const ...;`
pub fn parse_global_decl_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    match parser.current_token_kind() {
        TokenKind::Let | TokenKind::Const => parse_var_decl(parser, start, true),
        _ => Err(parser.unexpected("expected 'let' or 'const' after 'global'")),
    }
}

fn parse_var_decl(parser: &mut Parser, start: Position, is_global: bool) -> Result<StmtWrapper, Error> {
    let is_constant = parser.advance().kind == TokenKind::Const;

    let error = parser.unexpected("expected identifier during variable declaration");
    let identifier = identifier_from(&parser.expect_error(TokenKind::Identifier, Some(error))?);

    let explicit_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let error = parser.unexpected("expected '=' during variable declaration");
    parser.expect_error(TokenKind::Assignment, Some(error))?;
    let assigned_value = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;

    Ok(StmtWrapper::new(VarDeclStmt {
        span: Span {
            start,
            end: parser.previous_end()
        },
        identifier,
        is_constant,
        is_global,
        assigned_value,
        explicit_type
    }))
}

/// `name = value;` and the compound forms, which become `name = name <op> value;`.
pub fn parse_reassignment_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let name_token = parser.advance().clone();
    let identifier = identifier_from(&name_token);

    let operator = parser.advance().clone();
    let rhs = parse_expr(parser, BindingPower::Default)?;

    let value = match operator.kind.compound_operator() {
        Some(kind) => {
            let value = operator.value.trim_end_matches('=').to_string();
            ExprWrapper::new(BinaryExpr {
                span: Span {
                    start: name_token.span.start.clone(),
                    end: rhs.get_span().end.clone()
                },
                left: ExprWrapper::new(SymbolExpr { value: name_token.value.clone(), span: name_token.span.clone() }),
                operator: Token { kind, value, span: operator.span.clone() },
                right: rhs,
            })
        }
        None => rhs,
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(StmtWrapper::new(ReassignmentStmt {
        identifier,
        value,
        span: Span {
            start: name_token.span.start,
            end: parser.previous_end()
        }
    }))
}

/// `import a, b from some.module;`
pub fn parse_import_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let mut names = vec![identifier_from(&parser.expect(TokenKind::Identifier)?)];
    while parser.current_token_kind() == TokenKind::Comma {
        parser.advance();
        names.push(identifier_from(&parser.expect(TokenKind::Identifier)?));
    }

    let error = parser.unexpected("expected 'from' after imported names");
    parser.expect_error(TokenKind::From, Some(error))?;

    let mut module = vec![parser.expect(TokenKind::Identifier)?.value];
    while parser.current_token_kind() == TokenKind::Dot {
        parser.advance();
        module.push(parser.expect(TokenKind::Identifier)?.value);
    }

    parser.expect(TokenKind::Semicolon)?;

    Ok(StmtWrapper::new(ImportStmt {
        names,
        module,
        span: Span {
            start,
            end: parser.previous_end()
        }
    }))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_body = parse_block(parser)?;

    let else_body = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        if parser.current_token_kind() == TokenKind::If {
            Some(parse_if_stmt(parser)?)
        } else {
            Some(StmtWrapper::new(parse_block(parser)?))
        }
    } else {
        None
    };

    Ok(StmtWrapper::new(IfStmt {
        condition,
        then_body,
        else_body,
        span: Span {
            start,
            end: parser.previous_end()
        }
    }))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(StmtWrapper::new(WhileStmt {
        condition,
        body,
        span: Span {
            start,
            end: parser.previous_end()
        }
    }))
}

/// `{ stmt* }`
pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let error = parser.unexpected("expected '{' to open a block");
    let start = parser.expect_error(TokenKind::OpenCurly, Some(error))?.span.start;

    let mut statements = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected("unterminated block"));
        }
        statements.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockStmt {
        body: statements,
        span: Span {
            start,
            end: parser.previous_end()
        }
    })
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let identifier = identifier_from(&parser.expect(TokenKind::Identifier)?);

    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let name = identifier_from(&parser.expect(TokenKind::Identifier)?);
        let annotation = if parser.current_token_kind() == TokenKind::Colon {
            parser.advance();
            Some(parse_type(parser, BindingPower::Default)?)
        } else {
            None
        };
        parameters.push((name, annotation));

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected("expected ',' between parameters"));
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    Ok(StmtWrapper::new(FnDeclStmt {
        span: Span {
            start,
            end: parser.previous_end()
        },
        identifier,
        parameters,
        return_type,
        body
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(StmtWrapper::new(ReturnStmt {
        value,
        span: Span {
            start,
            end: parser.previous_end()
        }
    }))
}
