//! Feature template validation with rich diagnostics.
//!
//! Templates are JSON documents describing how a feature is rendered. Their
//! string values may carry `${path}` attribute references and `$${expr}`
//! conditions, and objects or arrays may carry a `$source` that moves
//! resolution into a nested attribute. This crate reads such templates and
//! checks every reference against a feature type schema before any feature
//! is encoded.
//!
//! # Example
//!
//! ```
//! use feature_template::{InMemorySchema, read_template, validate};
//!
//! let schema = InMemorySchema::example();
//! let template = read_template(
//!     r#"{
//!         "@type": "MappedFeature",
//!         "name": "${gml:name}",
//!         "unit": {
//!             "$source": "gsml:specification",
//!             "purpose": "${gsml:purpose}",
//!             "feature": "${../gml:name}"
//!         }
//!     }"#,
//! )
//! .unwrap();
//!
//! assert!(validate(&template, &schema));
//! ```

pub mod ast;
pub mod diag;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantic;

pub use ast::{Expression, Span, NodePath, Template, TemplateNode};
pub use diag::{Diag, DiagLabel, ExpressionSource};
pub use error::{TemplateError, ValidationError, ValidationErrorKind};
pub use lexer::token::{Token, TokenKind};
pub use lexer::{LexerResult, tokenize};
pub use parser::{ExpressionParseResult, parse_expression, read_template};
pub use semantic::{
    AscentPolicy, FunctionRegistry, InMemoryFunctionRegistry, InMemorySchema, SchemaProvider,
    TemplateValidator, ValidationConfig, ValidationMode, ValidationOutcome,
};

/// Validates `template` against `schema` with the default configuration
/// and the built-in functions.
pub fn validate(template: &Template, schema: &dyn SchemaProvider) -> bool {
    TemplateValidator::new(schema).validate(template)
}
