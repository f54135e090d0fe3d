use std::{any::Any, slice::Iter};

use crate::Span;

use super::ast::{ExprWrapper, Identifier, Stmt, StmtType, StmtWrapper, TypeWrapper};

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub body: Vec<StmtWrapper>,
    pub span: Span
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, StmtWrapper> {
        self.body.iter()
    }
}

impl Stmt for BlockStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::BlockStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// A bare expression, usually a call, evaluated for its effects.
#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub expression: ExprWrapper,
    pub span: Span
}

impl Stmt for ExpressionStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::ExpressionStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// `[global] let|const name [: Type] = value;`
#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub identifier: Identifier,
    pub is_constant: bool,
    /// Binds into the program's root environment instead of the current one.
    pub is_global: bool,
    pub assigned_value: ExprWrapper,
    pub explicit_type: Option<TypeWrapper>,
    pub span: Span
}

impl Stmt for VarDeclStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::VarDeclStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// `name = value;` (compound forms are desugared by the parser)
#[derive(Debug, Clone)]
pub struct ReassignmentStmt {
    pub identifier: Identifier,
    pub value: ExprWrapper,
    pub span: Span
}

impl Stmt for ReassignmentStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::ReassignmentStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

/// `import a, b from some.module;`
#[derive(Debug, Clone)]
pub struct ImportStmt {
    pub names: Vec<Identifier>,
    /// Dotted module path, one entry per segment.
    pub module: Vec<String>,
    pub span: Span
}

impl ImportStmt {
    pub fn module_name(&self) -> String {
        self.module.join(".")
    }

    pub fn is_std(&self) -> bool {
        self.module.first().map(|root| root == "std").unwrap_or(false)
    }
}

impl Stmt for ImportStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::ImportStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: ExprWrapper,
    pub then_body: BlockStmt,
    /// Either a `BlockStmt` or, for `else if`, another `IfStmt`.
    pub else_body: Option<StmtWrapper>,
    pub span: Span
}

impl Stmt for IfStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::IfStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: ExprWrapper,
    pub body: BlockStmt,
    pub span: Span
}

impl Stmt for WhileStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::WhileStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

#[derive(Debug, Clone)]
pub struct FnDeclStmt {
    pub identifier: Identifier,
    pub parameters: Vec<(Identifier, Option<TypeWrapper>)>,
    pub return_type: Option<TypeWrapper>,
    pub body: BlockStmt,
    pub span: Span
}

impl Stmt for FnDeclStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::FnDeclStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<ExprWrapper>,
    pub span: Span
}

impl Stmt for ReturnStmt {
    fn get_stmt_type(&self) -> StmtType {
        StmtType::ReturnStmt
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn clone_wrapper(&self) -> StmtWrapper {
        StmtWrapper::new(self.clone())
    }
    fn get_span(&self) -> &Span {
        &self.span
    }
}
