//! Template and expression syntax trees.

pub mod expression;
pub mod span;
pub mod template;
pub mod visitor;

pub use expression::{
    BinaryExpression, BinaryOperator, Expression, ExpressionKind, FunctionCall,
    InvalidExpression, Literal, PathExpression, UnaryExpression, UnaryOperator,
};
pub use span::Span;
pub use template::{
    ConditionExpression, LeafValue, NodePath, RootNode, ScopeNode, SourceExpression, StaticNode, Template,
    TemplateNode, ValueLeaf,
};
pub use visitor::{ExpressionVisitor, VisitResult, collect_paths, walk_expression, walk_function};
