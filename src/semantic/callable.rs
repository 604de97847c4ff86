//! Function registry used for arity checking.
//!
//! Only the minimum argument count matters to template validation: a call
//! supplying fewer arguments can never be evaluated, while extra arguments
//! are left to the function itself.

use smol_str::SmolStr;
use std::collections::HashMap;

/// Declared argument requirements of filter functions.
pub trait FunctionRegistry: Send + Sync {
    /// Minimum number of arguments `name` must be called with, or `None`
    /// when the function is not registered.
    fn required_argument_count(&self, name: &str) -> Option<usize>;
}

/// Built-in filter functions and their required argument counts.
const BUILTIN_FUNCTIONS: &[(&str, usize)] = &[
    // Strings
    ("concat", 2),
    ("strConcat", 2),
    ("strCapitalize", 1),
    ("strEndsWith", 2),
    ("strEqualsIgnoreCase", 2),
    ("strIndexOf", 2),
    ("strLastIndexOf", 2),
    ("strLength", 1),
    ("strMatches", 2),
    ("strReplace", 4),
    ("strStartsWith", 2),
    ("strSubstring", 3),
    ("strSubstringStart", 2),
    ("strToLowerCase", 1),
    ("strToUpperCase", 1),
    ("strTrim", 1),
    ("strURLEncode", 1),
    // Logic and comparison
    ("between", 3),
    ("equalTo", 2),
    ("greaterThan", 2),
    ("if_then_else", 3),
    ("isNull", 1),
    ("lessThan", 2),
    ("notEqualTo", 2),
    // Math
    ("abs", 1),
    ("ceil", 1),
    ("floor", 1),
    ("max", 2),
    ("min", 2),
    ("pow", 2),
    ("rint", 1),
    ("round", 1),
    ("sqrt", 1),
    // Formatting
    ("dateFormat", 2),
    ("dateParse", 2),
    ("numberFormat", 2),
    // Geometry
    ("area", 1),
    ("boundary", 1),
    ("buffer", 2),
    ("centroid", 1),
    ("envelope", 1),
    ("geometryType", 1),
    ("isValid", 1),
    ("numGeometries", 1),
    ("toWKT", 1),
    // Variadic
    ("Concatenate", 0),
    ("list", 0),
];

/// Looks up the required argument count of a built-in function.
pub fn lookup_builtin_function(name: &str) -> Option<usize> {
    BUILTIN_FUNCTIONS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, required)| *required)
}

/// Lists the built-in functions with their required argument counts.
pub fn list_builtin_functions() -> impl Iterator<Item = (&'static str, usize)> {
    BUILTIN_FUNCTIONS.iter().copied()
}

/// Registry of the built-in functions only.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFunctionRegistry;

impl FunctionRegistry for BuiltinFunctionRegistry {
    fn required_argument_count(&self, name: &str) -> Option<usize> {
        lookup_builtin_function(name)
    }
}

/// Registry of custom functions, optionally layered over the built-ins.
///
/// Custom registrations shadow built-ins of the same name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFunctionRegistry {
    functions: HashMap<SmolStr, usize>,
    include_builtins: bool,
}

impl InMemoryFunctionRegistry {
    /// Creates an empty registry without built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that falls back to the built-ins.
    pub fn with_builtins() -> Self {
        Self {
            functions: HashMap::new(),
            include_builtins: true,
        }
    }

    pub fn with_function(mut self, name: impl Into<SmolStr>, required: usize) -> Self {
        self.register(name, required);
        self
    }

    pub fn register(&mut self, name: impl Into<SmolStr>, required: usize) {
        self.functions.insert(name.into(), required);
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FunctionRegistry for InMemoryFunctionRegistry {
    fn required_argument_count(&self, name: &str) -> Option<usize> {
        self.functions
            .get(name)
            .copied()
            .or_else(|| self.include_builtins.then(|| lookup_builtin_function(name)).flatten())
    }
}
