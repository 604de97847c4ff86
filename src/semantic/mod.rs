//! Semantic validation of templates against a feature type schema.
//!
//! Validation is a single walk over the template tree:
//!
//! 1. **Scope tracking** - scope nodes with a `$source` push the type they
//!    resolve to onto a [`ScopeArena`]; their children resolve against it.
//! 2. **Path resolution** - `${...}` leaves and the paths inside `$${...}`
//!    conditions are resolved with [`PathResolver`], honouring `../` ascent.
//! 3. **Arity checking** - function calls in conditions are checked against
//!    a [`FunctionRegistry`].
//!
//! # Example
//!
//! ```
//! use feature_template::parser::read_template;
//! use feature_template::semantic::{InMemorySchema, TemplateValidator};
//!
//! let schema = InMemorySchema::example();
//! let template = read_template(r#"{ "name": "${gml:name}" }"#).unwrap();
//! assert!(TemplateValidator::new(&schema).validate(&template));
//! ```

pub mod callable;
pub mod checker;
pub mod resolver;
pub mod schema;
pub mod scope;
pub mod validator;

pub use callable::{
    BuiltinFunctionRegistry, FunctionRegistry, InMemoryFunctionRegistry, list_builtin_functions,
    lookup_builtin_function,
};
pub use checker::{ExpressionChecker, ExpressionFailure, check_function_arity};
pub use resolver::{AscentPolicy, PathResolver, Resolution, resolve_path, split_ascent};
pub use schema::{
    AttributeDefinition, ComplexType, InMemorySchema, SchemaProvider, SimpleType, TypeDescriptor,
    local_name,
};
pub use scope::{ScopeArena, ScopeId, ScopeUnderflow};
pub use validator::{
    TemplateValidator, ValidationConfig, ValidationIssue, ValidationMode, ValidationOutcome,
};
