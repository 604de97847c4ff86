//! Path resolution against the scope chain.
//!
//! A path is `/`-separated attribute names. Each `../` marker moves
//! resolution one scope outwards; a segment starting with `@` addresses a
//! pseudo attribute (identifiers, namespaces) that the schema does not
//! describe.

use std::borrow::Cow;

use crate::ast::expression::PathExpression;
use crate::error::ValidationError;
use crate::semantic::schema::{SchemaProvider, TypeDescriptor};
use crate::semantic::scope::{ScopeArena, ScopeId};

/// Marker that moves resolution to the enclosing scope.
pub const ASCENT_MARKER: &str = "../";

/// First character of a pseudo-segment.
pub const PSEUDO_MARKER: char = '@';

pub const SEGMENT_SEPARATOR: char = '/';

/// Where `../` markers may appear in a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AscentPolicy {
    /// Every `../` occurrence counts as an ascent and is removed, wherever
    /// it appears. `../a/../b` ascends twice and resolves `a/b`.
    #[default]
    Permissive,
    /// Markers must form a leading run; a later `../` is a structural error.
    LeadingOnly,
}

/// Successful outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The type of the attribute the path reaches.
    Attribute(TypeDescriptor),
    /// The path ends in a pseudo attribute and carries no type.
    Pseudo,
}

impl Resolution {
    pub fn type_descriptor(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Attribute(descriptor) => Some(descriptor),
            Self::Pseudo => None,
        }
    }
}

/// Splits `text` into its ascent count and the path left to resolve.
pub fn split_ascent(text: &str, policy: AscentPolicy) -> Result<(usize, Cow<'_, str>), ValidationError> {
    match policy {
        AscentPolicy::Permissive => {
            if !text.contains(ASCENT_MARKER) {
                return Ok((0, Cow::Borrowed(text)));
            }
            // Removing a marker can splice its neighbours into a new one, so
            // strip the first occurrence until none is left.
            let mut remainder = text.to_string();
            let mut ascent = 0;
            while let Some(index) = remainder.find(ASCENT_MARKER) {
                remainder.replace_range(index..index + ASCENT_MARKER.len(), "");
                ascent += 1;
            }
            Ok((ascent, Cow::Owned(remainder)))
        }
        AscentPolicy::LeadingOnly => {
            let mut remainder = text;
            let mut ascent = 0;
            while let Some(rest) = remainder.strip_prefix(ASCENT_MARKER) {
                remainder = rest;
                ascent += 1;
            }
            if remainder.contains(ASCENT_MARKER) {
                return Err(ValidationError::structural(format!(
                    "'{}' may only appear at the start of path '{}'",
                    ASCENT_MARKER, text
                )));
            }
            Ok((ascent, Cow::Borrowed(remainder)))
        }
    }
}

/// Strips an XPath-style `[n]` index from a segment.
fn strip_index(segment: &str) -> &str {
    match segment.find('[') {
        Some(index) if segment.ends_with(']') => &segment[..index],
        _ => segment,
    }
}

/// Resolves paths against the scope chain and a schema.
#[derive(Clone, Copy)]
pub struct PathResolver<'a> {
    schema: &'a dyn SchemaProvider,
    policy: AscentPolicy,
}

impl<'a> PathResolver<'a> {
    pub fn new(schema: &'a dyn SchemaProvider, policy: AscentPolicy) -> Self {
        Self { schema, policy }
    }

    /// Resolves `path` as seen from `scope`.
    ///
    /// Ascent is applied first, so a path that climbs past the root fails
    /// even when the rest of it would resolve, pseudo attributes included.
    pub fn resolve(
        &self,
        scopes: &ScopeArena,
        scope: ScopeId,
        path: &PathExpression,
    ) -> Result<Resolution, ValidationError> {
        let (ascent, remainder) = split_ascent(&path.text, self.policy)?;
        let target = scopes
            .ascend(scope, ascent)
            .map_err(|underflow| ValidationError::ScopeUnderflow {
                path: path.text.clone(),
                requested: underflow.requested,
                available: underflow.available,
            })?;

        let mut current = scopes.current_type(target).clone();
        let remainder = remainder.trim();
        if remainder.is_empty() || remainder == "." {
            return Ok(Resolution::Attribute(current));
        }

        for raw in remainder.split(SEGMENT_SEPARATOR) {
            let raw = raw.trim();
            if raw.starts_with(PSEUDO_MARKER) {
                return Ok(Resolution::Pseudo);
            }
            let segment = strip_index(raw);
            if segment.is_empty() {
                return Err(ValidationError::structural(format!(
                    "empty segment in path '{}'",
                    path.text
                )));
            }
            if segment == "." {
                continue;
            }
            current = self
                .schema
                .resolve_attribute(&current, segment)
                .ok_or_else(|| ValidationError::PathNotFound {
                    path: path.text.clone(),
                    segment: segment.into(),
                    owner: current.to_string().into(),
                })?;
        }

        Ok(Resolution::Attribute(current))
    }
}

/// Resolves `path` from `scope` with the given policy.
pub fn resolve_path(
    schema: &dyn SchemaProvider,
    policy: AscentPolicy,
    scopes: &ScopeArena,
    scope: ScopeId,
    path: &PathExpression,
) -> Result<Resolution, ValidationError> {
    PathResolver::new(schema, policy).resolve(scopes, scope, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorKind;
    use crate::semantic::schema::{ComplexType, InMemorySchema, SimpleType};

    fn schema() -> InMemorySchema {
        InMemorySchema::new(
            ComplexType::new("Station")
                .with_attribute("name", TypeDescriptor::Simple(SimpleType::String))
                .with_collection("members", TypeDescriptor::complex("Member")),
        )
        .with_type(
            ComplexType::new("Member")
                .with_attribute("code", TypeDescriptor::Simple(SimpleType::Integer))
                .with_attribute("detail", TypeDescriptor::complex("Detail")),
        )
        .with_type(
            ComplexType::new("Detail")
                .with_attribute("note", TypeDescriptor::Simple(SimpleType::String)),
        )
    }

    fn resolve(
        schema: &InMemorySchema,
        scopes: &ScopeArena,
        scope: ScopeId,
        text: &str,
    ) -> Result<Resolution, ValidationError> {
        resolve_path(schema, AscentPolicy::Permissive, scopes, scope, &PathExpression::new(text))
    }

    #[test]
    fn split_permissive_counts_every_marker() {
        assert_eq!(split_ascent("name", AscentPolicy::Permissive).unwrap(), (0, "name".into()));
        assert_eq!(split_ascent("../../name", AscentPolicy::Permissive).unwrap(), (2, "name".into()));
        assert_eq!(
            split_ascent("../a/../b", AscentPolicy::Permissive).unwrap(),
            (2, "a/b".into())
        );
    }

    #[test]
    fn split_leading_only_rejects_inner_markers() {
        assert_eq!(
            split_ascent("../../name", AscentPolicy::LeadingOnly).unwrap(),
            (2, "name".into())
        );
        let error = split_ascent("../a/../b", AscentPolicy::LeadingOnly).unwrap_err();
        assert_eq!(error.kind(), ValidationErrorKind::StructuralError);
    }

    #[test]
    fn resolves_simple_attribute() {
        let schema = schema();
        let scopes = ScopeArena::new(schema.feature_type());
        assert_eq!(
            resolve(&schema, &scopes, scopes.root(), "name").unwrap(),
            Resolution::Attribute(TypeDescriptor::Simple(SimpleType::String))
        );
    }

    #[test]
    fn resolves_nested_segments() {
        let schema = schema();
        let scopes = ScopeArena::new(schema.feature_type());
        assert_eq!(
            resolve(&schema, &scopes, scopes.root(), "members/detail/note").unwrap(),
            Resolution::Attribute(TypeDescriptor::Simple(SimpleType::String))
        );
    }

    #[test]
    fn index_predicate_is_ignored() {
        let schema = schema();
        let scopes = ScopeArena::new(schema.feature_type());
        assert!(resolve(&schema, &scopes, scopes.root(), "members[2]/code").is_ok());
    }

    #[test]
    fn missing_segment_reports_owner() {
        let schema = schema();
        let scopes = ScopeArena::new(schema.feature_type());
        let error = resolve(&schema, &scopes, scopes.root(), "members/missing").unwrap_err();
        assert_eq!(
            error,
            ValidationError::PathNotFound {
                path: "members/missing".into(),
                segment: "missing".into(),
                owner: "Member".into(),
            }
        );
    }

    #[test]
    fn ascent_resolves_in_enclosing_scope() {
        let schema = schema();
        let mut scopes = ScopeArena::new(schema.feature_type());
        let member = scopes.push(TypeDescriptor::complex("Member"), scopes.root());
        assert!(resolve(&schema, &scopes, member, "name").is_err());
        assert!(resolve(&schema, &scopes, member, "../name").is_ok());
        assert!(resolve(&schema, &scopes, member, "code").is_ok());
    }

    #[test]
    fn ascent_past_root_underflows_even_for_pseudo() {
        let schema = schema();
        let scopes = ScopeArena::new(schema.feature_type());
        let error = resolve(&schema, &scopes, scopes.root(), "../name").unwrap_err();
        assert_eq!(error.kind(), ValidationErrorKind::ScopeUnderflow);
        let error = resolve(&schema, &scopes, scopes.root(), "../@id").unwrap_err();
        assert_eq!(error.kind(), ValidationErrorKind::ScopeUnderflow);
    }

    #[test]
    fn pseudo_segment_resolves_without_schema() {
        let schema = schema();
        let mut scopes = ScopeArena::new(schema.feature_type());
        let simple = scopes.push(TypeDescriptor::Simple(SimpleType::String), scopes.root());
        assert_eq!(
            resolve(&schema, &scopes, simple, "@id").unwrap(),
            Resolution::Pseudo
        );
        assert_eq!(
            resolve(&schema, &scopes, scopes.root(), "members/@codeSpace").unwrap(),
            Resolution::Pseudo
        );
    }

    #[test]
    fn padded_pseudo_segment_is_recognised() {
        let schema = schema();
        let scopes = ScopeArena::new(schema.feature_type());
        assert_eq!(
            resolve(&schema, &scopes, scopes.root(), "members/ @id").unwrap(),
            Resolution::Pseudo
        );
    }

    #[test]
    fn segments_before_pseudo_still_resolve() {
        let schema = schema();
        let scopes = ScopeArena::new(schema.feature_type());
        let error = resolve(&schema, &scopes, scopes.root(), "nothing/@codeSpace").unwrap_err();
        assert_eq!(error.kind(), ValidationErrorKind::PathNotFound);
    }

    #[test]
    fn bare_ascent_yields_enclosing_type() {
        let schema = schema();
        let mut scopes = ScopeArena::new(schema.feature_type());
        let member = scopes.push(TypeDescriptor::complex("Member"), scopes.root());
        assert_eq!(
            resolve(&schema, &scopes, member, "../").unwrap(),
            Resolution::Attribute(TypeDescriptor::complex("Station"))
        );
    }

    #[test]
    fn empty_segment_is_structural() {
        let schema = schema();
        let scopes = ScopeArena::new(schema.feature_type());
        let error = resolve(&schema, &scopes, scopes.root(), "members//code").unwrap_err();
        assert_eq!(error.kind(), ValidationErrorKind::StructuralError);
    }

    #[test]
    fn simple_types_cannot_be_navigated() {
        let schema = schema();
        let scopes = ScopeArena::new(schema.feature_type());
        let error = resolve(&schema, &scopes, scopes.root(), "name/length").unwrap_err();
        assert_eq!(error.kind(), ValidationErrorKind::PathNotFound);
    }
}
