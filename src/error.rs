//! Error types for template reading and template validation.

use crate::ast::Span;
use crate::diag::Diag;
use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Why a template was rejected.
///
/// Every variant collapses to the same outcome at the top level: the
/// template is invalid. The payload exists for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    /// A `../` ascent went past the outermost scope.
    #[error(
        "path '{path}' ascends {requested} scope level(s) but only {available} enclosing scope(s) exist"
    )]
    #[diagnostic(
        code(template::scope_underflow),
        help("remove '../' markers or move the entry into a nested scope")
    )]
    ScopeUnderflow {
        path: SmolStr,
        requested: usize,
        available: usize,
    },

    /// A segment did not name an attribute of the type in scope.
    #[error("path '{path}': attribute '{segment}' not found in {owner}")]
    #[diagnostic(
        code(template::path_not_found),
        help("check the attribute name against the feature type schema")
    )]
    PathNotFound {
        path: SmolStr,
        segment: SmolStr,
        owner: SmolStr,
    },

    /// A function was called with fewer arguments than it declares.
    #[error("function '{function}' requires {required} argument(s), got {supplied}")]
    #[diagnostic(code(template::arity))]
    ArityError {
        function: SmolStr,
        required: usize,
        supplied: usize,
    },

    /// A function the registry does not know, in strict function mode.
    #[error("function '{function}' is not registered")]
    #[diagnostic(code(template::unknown_function))]
    UnknownFunction { function: SmolStr },

    /// Expression text or shape the validator cannot work with.
    #[error("malformed expression: {reason}")]
    #[diagnostic(code(template::structure))]
    StructuralError { reason: String },

    /// An array scope with no `$source` to iterate.
    #[error("repeating scope has no '$source' to iterate")]
    #[diagnostic(
        code(template::repeating_without_source),
        help("add a '$source' naming the collection attribute")
    )]
    RepeatingScopeWithoutSource,

    /// The template nests deeper than the configured limit.
    #[error("template nests deeper than {limit} levels")]
    #[diagnostic(code(template::depth_limit))]
    DepthLimitExceeded { limit: usize },
}

/// Fieldless mirror of [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    ScopeUnderflow,
    PathNotFound,
    ArityError,
    UnknownFunction,
    StructuralError,
    RepeatingScopeWithoutSource,
    DepthLimitExceeded,
}

impl ValidationErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::ScopeUnderflow => "ScopeUnderflow",
            Self::PathNotFound => "PathNotFound",
            Self::ArityError => "ArityError",
            Self::UnknownFunction => "UnknownFunction",
            Self::StructuralError => "StructuralError",
            Self::RepeatingScopeWithoutSource => "RepeatingScopeWithoutSource",
            Self::DepthLimitExceeded => "DepthLimitExceeded",
        }
    }
}

impl ValidationError {
    pub fn structural(reason: impl Into<String>) -> Self {
        Self::StructuralError {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::ScopeUnderflow { .. } => ValidationErrorKind::ScopeUnderflow,
            Self::PathNotFound { .. } => ValidationErrorKind::PathNotFound,
            Self::ArityError { .. } => ValidationErrorKind::ArityError,
            Self::UnknownFunction { .. } => ValidationErrorKind::UnknownFunction,
            Self::StructuralError { .. } => ValidationErrorKind::StructuralError,
            Self::RepeatingScopeWithoutSource => ValidationErrorKind::RepeatingScopeWithoutSource,
            Self::DepthLimitExceeded { .. } => ValidationErrorKind::DepthLimitExceeded,
        }
    }

    /// Converts this error to a diagnostic pointing at `span` in the
    /// expression text of the offending entry.
    pub fn to_diag(&self, span: Span) -> Diag {
        let code = format!("template::{}", self.code_suffix());
        let diag = Diag::new(self.to_string()).with_code(code);
        match self {
            Self::ScopeUnderflow { .. } => diag
                .with_label(span, "ascends past the outermost scope")
                .with_help("remove '../' markers or move the entry into a nested scope"),
            Self::PathNotFound { segment, owner, .. } => diag
                .with_label(span, format!("'{}' is not an attribute of {}", segment, owner))
                .with_help("check the attribute name against the feature type schema"),
            Self::ArityError { required, .. } => diag.with_label(
                span,
                format!("expected at least {} argument(s)", required),
            ),
            Self::UnknownFunction { .. } => diag.with_label(span, "unknown function"),
            Self::StructuralError { .. } => diag.with_label(span, "cannot validate this"),
            Self::RepeatingScopeWithoutSource => {
                diag.with_help("add a '$source' naming the collection attribute")
            }
            Self::DepthLimitExceeded { .. } => diag,
        }
    }

    fn code_suffix(&self) -> &'static str {
        match self {
            Self::ScopeUnderflow { .. } => "scope_underflow",
            Self::PathNotFound { .. } => "path_not_found",
            Self::ArityError { .. } => "arity",
            Self::UnknownFunction { .. } => "unknown_function",
            Self::StructuralError { .. } => "structure",
            Self::RepeatingScopeWithoutSource => "repeating_without_source",
            Self::DepthLimitExceeded { .. } => "depth_limit",
        }
    }
}

/// Errors raised while reading a template document.
#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("template is not valid JSON: {0}")]
    #[diagnostic(code(template::json))]
    Json(#[from] serde_json::Error),

    #[error("template root must be a JSON object")]
    #[diagnostic(code(template::root))]
    RootNotObject,

    #[error("'$source' at {path} must be a string")]
    #[diagnostic(code(template::source))]
    InvalidSource { path: String },

    #[error("expression at {path} is missing its closing '}}'")]
    #[diagnostic(code(template::unterminated))]
    UnterminatedExpression { path: String },
}
