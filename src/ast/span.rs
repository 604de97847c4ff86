//! Source spans for embedded expression text.

use std::ops::Range;

/// Byte range inside the expression text of a single template entry.
///
/// Template documents are JSON, so spans never point into the document
/// itself: they index the text between `${` and `}` (or `$${` and `}`).
pub type Span = Range<usize>;
