//! Parsers for template documents and the expressions embedded in them.

pub mod expression;
pub mod template;

pub use expression::{ExpressionParseResult, parse_expression};
pub use template::{SOURCE_KEY, read_template, template_from_value};
