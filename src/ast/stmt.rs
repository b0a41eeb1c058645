//! Statement AST node types

use super::*;

/// A statement
#[derive(Debug, Clone)]
pub enum Statement {
    /// Block statement { ... }
    Block(Vec<Statement>),

    /// Empty statement ;
    Empty,

    /// Expression statement
    Expression(Expression),

    /// Variable declaration (var, let, const)
    VariableDeclaration(VariableDeclaration),

    /// Function declaration
    FunctionDeclaration(FunctionRef),

    /// If statement
    If(Box<IfStatement>),

    /// Return statement
    Return(Option<Expression>),

    /// Throw statement
    Throw(Expression),

    /// Try statement
    Try(Box<TryStatement>),
}

/// Variable declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub kind: VariableKind,
    pub declarations: Vec<VariableDeclarator>,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub id: Identifier,
    pub init: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Statement,
    pub alternate: Option<Statement>,
}

#[derive(Debug, Clone)]
pub struct TryStatement {
    pub block: Vec<Statement>,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<Vec<Statement>>,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub param: Option<Identifier>,
    pub body: Vec<Statement>,
}
