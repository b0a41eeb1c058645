//! Expression AST node types

use super::*;

/// An expression
#[derive(Debug, Clone)]
pub enum Expression {
    /// Identifier reference
    Identifier(Identifier),

    /// Literal value
    Literal(Literal),

    /// Array literal [1, 2, 3]; `None` marks an elision
    Array(Vec<Option<Expression>>),

    /// Object literal {a: 1, b: 2}
    Object(Vec<Property>),

    /// Function expression
    Function(FunctionRef),

    /// this expression
    This(Span),

    /// Member expression obj.prop or obj[prop]
    Member(Box<MemberExpression>),

    /// Call expression func(args)
    Call(Box<CallExpression>),

    /// Unary expression !x, -x, typeof x
    Unary(Box<UnaryExpression>),

    /// Binary expression a + b
    Binary(Box<BinaryExpression>),

    /// Logical expression a && b
    Logical(Box<LogicalExpression>),

    /// Conditional expression a ? b : c
    Conditional(Box<ConditionalExpression>),

    /// Assignment expression a = b
    Assignment(Box<AssignmentExpression>),

    /// Sequence expression a, b
    Sequence(Vec<Expression>),
}

/// A literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

/// A property in an object literal
#[derive(Debug, Clone)]
pub struct Property {
    /// Property key, already reduced to its string form
    pub key: String,
    pub value: Expression,
}

/// Member expression
#[derive(Debug, Clone)]
pub struct MemberExpression {
    pub object: Expression,
    pub property: MemberProperty,
    pub span: Span,
}

/// The accessed property of a member expression
#[derive(Debug, Clone)]
pub enum MemberProperty {
    /// obj.name
    Named(String),
    /// obj[expr]
    Computed(Expression),
}

/// Call expression
#[derive(Debug, Clone)]
pub struct CallExpression {
    pub callee: Expression,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// -
    Minus,
    /// +
    Plus,
    /// !
    Not,
    /// typeof
    Typeof,
    /// void
    Void,
}

#[derive(Debug, Clone)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub argument: Expression,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
}

#[derive(Debug, Clone)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Expression,
    pub right: Expression,
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone)]
pub struct LogicalExpression {
    pub operator: LogicalOperator,
    pub left: Expression,
    pub right: Expression,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpression {
    pub test: Expression,
    pub consequent: Expression,
    pub alternate: Expression,
}

/// Assignment operators; compound forms carry their binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    Compound(BinaryOperator),
}

/// Assignment target
#[derive(Debug, Clone)]
pub enum AssignmentTarget {
    Identifier(Identifier),
    Member(Box<MemberExpression>),
}

#[derive(Debug, Clone)]
pub struct AssignmentExpression {
    pub operator: AssignmentOperator,
    pub target: AssignmentTarget,
    pub value: Expression,
}
