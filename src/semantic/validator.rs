//! Template validator.
//!
//! Walks the template tree depth-first, in child order, keeping the scope
//! each subtree resolves against. Scope nodes with a resolvable `$source`
//! push a new scope for their children; value leaves have their path or
//! condition checked against the scope they sit in.

use std::ops::ControlFlow;

use miette::Report;
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::ast::expression::PathExpression;
use crate::ast::template::{
    LeafValue, NodePath, ScopeNode, SourceExpression, Template, TemplateNode, ValueLeaf,
};
use crate::ast::Span;
use crate::diag::{Diag, ExpressionSource};
use crate::error::{ValidationError, ValidationErrorKind};
use crate::semantic::callable::{BuiltinFunctionRegistry, FunctionRegistry};
use crate::semantic::checker::ExpressionChecker;
use crate::semantic::resolver::{AscentPolicy, PathResolver, Resolution};
use crate::semantic::schema::{SchemaProvider, local_name};
use crate::semantic::scope::{ScopeArena, ScopeId};

static BUILTIN_FUNCTIONS: BuiltinFunctionRegistry = BuiltinFunctionRegistry;

/// How many problems a validation run reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Stop at the first rejected entry.
    #[default]
    FirstFailure,
    /// Keep checking siblings after a rejection. Children of a scope whose
    /// source failed to resolve are still skipped.
    CollectAll,
}

/// Configuration for template validation.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub mode: ValidationMode,

    /// Where `../` markers may appear in paths.
    pub ascent_policy: AscentPolicy,

    /// Reject calls to functions the registry does not know.
    pub strict_functions: bool,

    /// Deepest scope nesting accepted before the template is rejected.
    pub max_depth: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::FirstFailure,
            ascent_policy: AscentPolicy::Permissive,
            strict_functions: false,
            max_depth: 64,
        }
    }
}

/// One rejected template entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Location of the entry in the template.
    pub node: NodePath,
    pub error: ValidationError,
    /// Expression text of the entry, when it has one.
    pub source: Option<SmolStr>,
    /// Span of the failing part of `source`.
    pub span: Option<Span>,
}

impl ValidationIssue {
    pub fn kind(&self) -> ValidationErrorKind {
        self.error.kind()
    }

    pub fn to_diag(&self) -> Diag {
        self.error
            .to_diag(self.span.clone().unwrap_or(0..0))
            .with_note(format!("in template entry {}", self.node))
    }

    /// Renders the issue against the expression text it points into.
    pub fn to_report(&self) -> Report {
        let source =
            ExpressionSource::for_entry(self.source.as_deref().unwrap_or_default(), &self.node);
        self.to_diag().to_report(&source)
    }
}

/// Result of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn first_error(&self) -> Option<&ValidationError> {
        self.issues.first().map(|issue| &issue.error)
    }

    pub fn diagnostics(&self) -> Vec<Diag> {
        self.issues.iter().map(ValidationIssue::to_diag).collect()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.issues.iter().map(ValidationIssue::to_report).collect()
    }
}

/// Validates templates against one feature type schema.
pub struct TemplateValidator<'s> {
    pub(super) config: ValidationConfig,
    pub(super) schema: &'s dyn SchemaProvider,
    pub(super) functions: &'s dyn FunctionRegistry,
}

impl<'s> TemplateValidator<'s> {
    /// Creates a validator with the default configuration and the built-in
    /// function registry.
    pub fn new(schema: &'s dyn SchemaProvider) -> Self {
        Self {
            config: ValidationConfig::default(),
            schema,
            functions: &BUILTIN_FUNCTIONS,
        }
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_function_registry(mut self, functions: &'s dyn FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn with_ascent_policy(mut self, policy: AscentPolicy) -> Self {
        self.config.ascent_policy = policy;
        self
    }

    pub fn with_strict_functions(mut self, strict: bool) -> Self {
        self.config.strict_functions = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Returns whether the template is valid.
    ///
    /// Always stops at the first failure, whatever the configured mode.
    pub fn validate(&self, template: &Template) -> bool {
        self.run(template, ValidationMode::FirstFailure).is_valid()
    }

    /// Validates the template and reports the rejected entries, one or all
    /// depending on the configured mode. `check(t).is_valid()` always equals
    /// `validate(t)`.
    pub fn check(&self, template: &Template) -> ValidationOutcome {
        self.run(template, self.config.mode)
    }

    fn run(&self, template: &Template, mode: ValidationMode) -> ValidationOutcome {
        let mut walk = Walk {
            validator: self,
            resolver: PathResolver::new(self.schema, self.config.ascent_policy),
            scopes: ScopeArena::new(self.schema.feature_type()),
            root_name: local_name(self.schema.root_type_name()),
            stop_at_first: mode == ValidationMode::FirstFailure,
            issues: Vec::new(),
        };
        let root = walk.scopes.root();
        let _ = walk.walk_children(&template.root.children, root, 0);

        debug!(
            root = self.schema.root_type_name(),
            issues = walk.issues.len(),
            scopes = walk.scopes.len(),
            "template validated"
        );
        ValidationOutcome { issues: walk.issues }
    }
}

/// State of one validation run.
struct Walk<'w, 's> {
    validator: &'w TemplateValidator<'s>,
    resolver: PathResolver<'s>,
    scopes: ScopeArena,
    root_name: &'s str,
    stop_at_first: bool,
    issues: Vec<ValidationIssue>,
}

impl Walk<'_, '_> {
    fn walk_children(&mut self, children: &[TemplateNode], scope: ScopeId, depth: usize) -> ControlFlow<()> {
        for child in children {
            self.walk_node(child, scope, depth)?;
        }
        ControlFlow::Continue(())
    }

    fn walk_node(&mut self, node: &TemplateNode, scope: ScopeId, depth: usize) -> ControlFlow<()> {
        match node {
            TemplateNode::Value(leaf) => self.check_leaf(leaf, scope),
            TemplateNode::Scope(nested) => self.walk_scope(nested, scope, depth + 1),
            TemplateNode::Static(_) => ControlFlow::Continue(()),
        }
    }

    fn check_leaf(&mut self, leaf: &ValueLeaf, scope: ScopeId) -> ControlFlow<()> {
        match &leaf.value {
            LeafValue::Path(path) => {
                if path.text.trim().is_empty() {
                    let error = ValidationError::structural("empty path expression");
                    return self.report(&leaf.path, error, Some(path), Some(path.span.clone()));
                }
                match self.resolver.resolve(&self.scopes, scope, path) {
                    Ok(_) => ControlFlow::Continue(()),
                    Err(error) => {
                        self.report(&leaf.path, error, Some(path), Some(path.span.clone()))
                    }
                }
            }
            LeafValue::Condition(condition) => {
                let config = &self.validator.config;
                let result = ExpressionChecker::new(
                    self.resolver,
                    self.validator.functions,
                    &self.scopes,
                    scope,
                )
                .strict_functions(config.strict_functions)
                .check(&condition.expression);
                match result {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(failure) => self.push_issue(ValidationIssue {
                        node: leaf.path.clone(),
                        error: failure.error,
                        source: (!condition.text.is_empty()).then(|| condition.text.clone()),
                        span: Some(failure.span),
                    }),
                }
            }
        }
    }

    fn walk_scope(&mut self, node: &ScopeNode, scope: ScopeId, depth: usize) -> ControlFlow<()> {
        let limit = self.validator.config.max_depth;
        if depth > limit {
            return self.report(&node.path, ValidationError::DepthLimitExceeded { limit }, None, None);
        }

        let Some(source) = &node.source else {
            if node.repeating {
                return self.report(&node.path, ValidationError::RepeatingScopeWithoutSource, None, None);
            }
            return self.walk_children(&node.children, scope, depth);
        };

        if self.names_root_type(source) {
            trace!(node = %node.path, source = %source.text, "scope re-enters the root type");
            return self.walk_children(&node.children, scope, depth);
        }

        match self.resolver.resolve(&self.scopes, scope, &source.path) {
            Ok(Resolution::Attribute(descriptor)) => {
                trace!(node = %node.path, source = %source.text, scope_type = %descriptor, "scope pushed");
                let nested = self.scopes.push(descriptor, scope);
                self.walk_children(&node.children, nested, depth)
            }
            Ok(Resolution::Pseudo) => {
                let error = ValidationError::structural(format!(
                    "scope source '{}' names a pseudo attribute",
                    source.text
                ));
                self.report(&node.path, error, Some(&source.path), Some(source.path.span.clone()))
            }
            Err(error) => self.report(
                &node.path,
                error,
                Some(&source.path),
                Some(source.path.span.clone()),
            ),
        }
    }

    fn names_root_type(&self, source: &SourceExpression) -> bool {
        source.type_name() == self.root_name
    }

    fn report(
        &mut self,
        node: &NodePath,
        error: ValidationError,
        path: Option<&PathExpression>,
        span: Option<Span>,
    ) -> ControlFlow<()> {
        self.push_issue(ValidationIssue {
            node: node.clone(),
            error,
            source: path.map(|p| p.text.clone()),
            span,
        })
    }

    fn push_issue(&mut self, issue: ValidationIssue) -> ControlFlow<()> {
        debug!(node = %issue.node, kind = issue.kind().name(), error = %issue.error, "template entry rejected");
        self.issues.push(issue);
        if self.stop_at_first {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
