//! Expression checks: path resolution and function arity.

use std::ops::ControlFlow;

use crate::ast::expression::{Expression, FunctionCall, InvalidExpression, PathExpression};
use crate::ast::visitor::{ExpressionVisitor, VisitResult, walk_function};
use crate::ast::Span;
use crate::error::ValidationError;
use crate::semantic::callable::FunctionRegistry;
use crate::semantic::resolver::PathResolver;
use crate::semantic::scope::{ScopeArena, ScopeId};

/// A rejected expression and the span of the sub-expression at fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionFailure {
    pub error: ValidationError,
    pub span: Span,
}

/// Checks a call against its declared minimum argument count.
///
/// Unregistered functions pass unless `strict` is set.
pub fn check_function_arity(
    call: &FunctionCall,
    registry: &dyn FunctionRegistry,
    strict: bool,
) -> Result<(), ValidationError> {
    match registry.required_argument_count(&call.name) {
        Some(required) if call.arguments.len() < required => Err(ValidationError::ArityError {
            function: call.name.clone(),
            required,
            supplied: call.arguments.len(),
        }),
        Some(_) => Ok(()),
        None if strict => Err(ValidationError::UnknownFunction {
            function: call.name.clone(),
        }),
        None => Ok(()),
    }
}

/// Visitor that checks every path and call in a condition expression
/// against one scope, stopping at the first failure.
pub struct ExpressionChecker<'v> {
    pub(crate) resolver: PathResolver<'v>,
    pub(crate) registry: &'v dyn FunctionRegistry,
    pub(crate) strict_functions: bool,
    pub(crate) scopes: &'v ScopeArena,
    pub(crate) scope: ScopeId,
}

impl<'v> ExpressionChecker<'v> {
    pub fn new(
        resolver: PathResolver<'v>,
        registry: &'v dyn FunctionRegistry,
        scopes: &'v ScopeArena,
        scope: ScopeId,
    ) -> Self {
        Self {
            resolver,
            registry,
            strict_functions: false,
            scopes,
            scope,
        }
    }

    pub fn strict_functions(mut self, strict: bool) -> Self {
        self.strict_functions = strict;
        self
    }

    pub fn check(&mut self, expression: &Expression) -> Result<(), ExpressionFailure> {
        match self.visit_expression(expression) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(failure) => Err(failure),
        }
    }
}

impl ExpressionVisitor for ExpressionChecker<'_> {
    type Break = ExpressionFailure;

    fn visit_path(&mut self, path: &PathExpression) -> VisitResult<ExpressionFailure> {
        match self.resolver.resolve(self.scopes, self.scope, path) {
            Ok(_) => ControlFlow::Continue(()),
            Err(error) => ControlFlow::Break(ExpressionFailure {
                error,
                span: path.span.clone(),
            }),
        }
    }

    fn visit_function(&mut self, call: &FunctionCall) -> VisitResult<ExpressionFailure> {
        if let Err(error) = check_function_arity(call, self.registry, self.strict_functions) {
            return ControlFlow::Break(ExpressionFailure {
                error,
                span: call.span.clone(),
            });
        }
        walk_function(self, call)
    }

    fn visit_invalid(&mut self, invalid: &InvalidExpression) -> VisitResult<ExpressionFailure> {
        ControlFlow::Break(ExpressionFailure {
            error: ValidationError::structural(invalid.message.clone()),
            span: invalid.span.clone(),
        })
    }
}
