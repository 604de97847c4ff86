//! Expression AST for the two embedded template languages.
//!
//! Path expressions (`${...}` entries and `$source` values) and condition
//! expressions (`$${...}` entries) share one closed tree so that the
//! validator can match on every shape exhaustively.

use crate::ast::Span;
use smol_str::SmolStr;
use std::fmt;

/// An expression attached to a template entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Constant value.
    Literal(Literal, Span),

    /// Attribute navigation, e.g. `gml:name` or `"../gsml:specification/code"`.
    Path(PathExpression),

    /// Function call, e.g. `strConcat(name, '-')`.
    Function(FunctionCall),

    /// Binary operator application.
    Binary(BinaryExpression),

    /// Unary operator application.
    Unary(UnaryExpression),

    /// Text that failed to parse. Kept so that the failure surfaces when the
    /// template is validated instead of when it is loaded.
    Invalid(InvalidExpression),
}

/// Coarse shape of an expression, as seen by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    Literal,
    Path,
    Function,
    /// Operator nodes whose validity is the validity of their operands.
    Composite,
    Invalid,
}

/// Literal values. Numbers keep their source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Boolean(bool),
    Null,
    Integer(SmolStr),
    Float(SmolStr),
    String(SmolStr),
}

/// A path into the attributes of the type in scope.
///
/// The text is kept verbatim; ascent markers and pseudo-segments are
/// interpreted by the resolver, which owns the ascent policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
    pub text: SmolStr,
    pub span: Span,
}

impl PathExpression {
    /// Creates a path expression spanning the whole of `text`.
    pub fn new(text: impl Into<SmolStr>) -> Self {
        let text = text.into();
        let span = 0..text.len();
        Self { text, span }
    }

    /// Creates a path expression at an explicit span.
    pub fn with_span(text: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A call to a registered filter function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: SmolStr,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpression {
    pub op: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Minus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpression {
    pub op: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: Span,
}

/// Expression text rejected by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidExpression {
    pub text: SmolStr,
    pub message: String,
    pub span: Span,
}

impl Expression {
    /// Builds a path expression node spanning the whole of `text`.
    pub fn path(text: impl Into<SmolStr>) -> Self {
        Self::Path(PathExpression::new(text))
    }

    /// Builds a function call node with a zero-width span.
    pub fn call(name: impl Into<SmolStr>, arguments: Vec<Expression>) -> Self {
        Self::Function(FunctionCall {
            name: name.into(),
            arguments,
            span: 0..0,
        })
    }

    /// Builds a string literal node with a zero-width span.
    pub fn string(value: impl Into<SmolStr>) -> Self {
        Self::Literal(Literal::String(value.into()), 0..0)
    }

    pub fn kind(&self) -> ExpressionKind {
        match self {
            Self::Literal(..) => ExpressionKind::Literal,
            Self::Path(_) => ExpressionKind::Path,
            Self::Function(_) => ExpressionKind::Function,
            Self::Binary(_) | Self::Unary(_) => ExpressionKind::Composite,
            Self::Invalid(_) => ExpressionKind::Invalid,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Literal(_, span) => span.clone(),
            Self::Path(path) => path.span.clone(),
            Self::Function(call) => call.span.clone(),
            Self::Binary(binary) => binary.span.clone(),
            Self::Unary(unary) => unary.span.clone(),
            Self::Invalid(invalid) => invalid.span.clone(),
        }
    }

    /// Immediate structural children: operands of operators and arguments
    /// of function calls. Leaves have none.
    pub fn children(&self) -> Children<'_> {
        match self {
            Self::Literal(..) | Self::Path(_) | Self::Invalid(_) => Children::Empty,
            Self::Function(call) => Children::Slice(call.arguments.iter()),
            Self::Binary(binary) => Children::Pair(Some(&binary.left), Some(&binary.right)),
            Self::Unary(unary) => Children::Pair(Some(&unary.operand), None),
        }
    }
}

/// Iterator over the immediate children of an [`Expression`].
#[derive(Debug, Clone)]
pub enum Children<'a> {
    Empty,
    Pair(Option<&'a Expression>, Option<&'a Expression>),
    Slice(std::slice::Iter<'a, Expression>),
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a Expression;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Children::Empty => None,
            Children::Pair(first, second) => first.take().or_else(|| second.take()),
            Children::Slice(iter) => iter.next(),
        }
    }
}
