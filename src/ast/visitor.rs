//! Expression visitor infrastructure.
//!
//! Visitors receive the expression shapes the validator cares about (paths,
//! function calls, rejected text) and let `walk_*` functions handle the
//! operator plumbing in between.

use std::ops::ControlFlow;

use crate::ast::expression::{Expression, FunctionCall, InvalidExpression, Literal, PathExpression};
use crate::ast::Span;

macro_rules! try_visit {
    ($expr:expr) => {
        match $expr {
            ControlFlow::Continue(()) => {}
            ControlFlow::Break(b) => return ControlFlow::Break(b),
        }
    };
}

/// Shared type alias for visitor traversal methods.
pub type VisitResult<B> = ControlFlow<B>;

/// Immutable visitor over expression trees.
pub trait ExpressionVisitor {
    /// Early-exit payload produced when traversal stops.
    type Break;

    fn visit_expression(&mut self, expression: &Expression) -> VisitResult<Self::Break> {
        walk_expression(self, expression)
    }

    fn visit_literal(&mut self, _literal: &Literal, _span: &Span) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_path(&mut self, _path: &PathExpression) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_function(&mut self, call: &FunctionCall) -> VisitResult<Self::Break> {
        walk_function(self, call)
    }

    fn visit_invalid(&mut self, _invalid: &InvalidExpression) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }
}

pub fn walk_expression<V: ExpressionVisitor + ?Sized>(
    visitor: &mut V,
    expression: &Expression,
) -> VisitResult<V::Break> {
    match expression {
        Expression::Literal(literal, span) => visitor.visit_literal(literal, span),
        Expression::Path(path) => visitor.visit_path(path),
        Expression::Function(call) => visitor.visit_function(call),
        Expression::Invalid(invalid) => visitor.visit_invalid(invalid),
        Expression::Binary(_) | Expression::Unary(_) => {
            for child in expression.children() {
                try_visit!(visitor.visit_expression(child));
            }
            ControlFlow::Continue(())
        }
    }
}

/// Visits every argument of a function call, in order.
pub fn walk_function<V: ExpressionVisitor + ?Sized>(
    visitor: &mut V,
    call: &FunctionCall,
) -> VisitResult<V::Break> {
    for argument in &call.arguments {
        try_visit!(visitor.visit_expression(argument));
    }
    ControlFlow::Continue(())
}

/// Collects every path expression reachable from `expression`, in source order.
pub fn collect_paths(expression: &Expression) -> Vec<&PathExpression> {
    struct PathCollector<'a> {
        paths: Vec<&'a PathExpression>,
    }

    impl<'a> PathCollector<'a> {
        fn walk(&mut self, expression: &'a Expression) {
            match expression {
                Expression::Path(path) => self.paths.push(path),
                other => other.children().for_each(|child| self.walk(child)),
            }
        }
    }

    let mut collector = PathCollector { paths: Vec::new() };
    collector.walk(expression);
    collector.paths
}
