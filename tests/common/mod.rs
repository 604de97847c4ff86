//! Common test utilities
//!
//! Shared fixtures and assertion helpers for the integration tests.
//!
//! # Fixtures
//! - [`station_schema`] - Station feature type with a `members` collection
//! - [`station_without_code`] - Same schema, but `Member` has no `code`
//!
//! # Template Builders
//! - [`value`] / [`condition`] - Value leaves under the root
//! - [`members_scope`] - A repeating scope over `members:Member`
//!
//! # Assertion Helpers
//! - [`assert_valid`] - Assert that a template validates, showing issues otherwise
//! - [`assert_rejected_with`] - Assert the first rejection has the expected kind

#![allow(dead_code)]

use feature_template::ast::{
    ConditionExpression, Expression, NodePath, ScopeNode, Template, TemplateNode, ValueLeaf,
};
use feature_template::error::ValidationErrorKind;
use feature_template::parser::parse_expression;
use feature_template::semantic::{
    ComplexType, InMemorySchema, SimpleType, TemplateValidator, TypeDescriptor, ValidationMode,
};

// ============================================================================
// Schemas
// ============================================================================

fn station(member: ComplexType) -> InMemorySchema {
    InMemorySchema::new(
        ComplexType::new("st:Station")
            .with_attribute("name", TypeDescriptor::Simple(SimpleType::String))
            .with_attribute("elevation", TypeDescriptor::Simple(SimpleType::Double))
            .with_collection("members", TypeDescriptor::complex("Member")),
    )
    .with_type(member)
}

/// Station schema where `Member` carries `code` and `label`.
pub fn station_schema() -> InMemorySchema {
    station(
        ComplexType::new("Member")
            .with_attribute("code", TypeDescriptor::Simple(SimpleType::Integer))
            .with_attribute("label", TypeDescriptor::Simple(SimpleType::String)),
    )
}

/// Station schema where `Member` has no `code` attribute.
pub fn station_without_code() -> InMemorySchema {
    station(
        ComplexType::new("Member")
            .with_attribute("label", TypeDescriptor::Simple(SimpleType::String)),
    )
}

// ============================================================================
// Template Builders
// ============================================================================

pub fn value(key: &str, path: &str) -> TemplateNode {
    TemplateNode::Value(ValueLeaf::path_value(key, NodePath::root().child(key), path))
}

/// A condition leaf whose expression is parsed from `source`.
pub fn condition(key: &str, source: &str) -> TemplateNode {
    let expression = parse_expression(source).into_expression(source);
    let condition = ConditionExpression::new(source, expression);
    TemplateNode::Value(ValueLeaf::condition(key, NodePath::root().child(key), condition))
}

pub fn condition_expr(key: &str, expression: Expression) -> TemplateNode {
    TemplateNode::Value(ValueLeaf::condition(key, NodePath::root().child(key), expression))
}

pub fn members_scope(children: Vec<TemplateNode>) -> TemplateNode {
    let mut scope = ScopeNode::new(Some("members".into()), NodePath::root().child("members"))
        .with_source("members:Member")
        .repeating();
    scope.children = children;
    TemplateNode::Scope(scope)
}

pub fn template(children: Vec<TemplateNode>) -> Template {
    Template::new(children)
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert that `template` validates against `schema`.
///
/// # Panics
/// Panics with every collected issue when validation fails.
pub fn assert_valid(schema: &InMemorySchema, template: &Template) {
    let outcome = TemplateValidator::new(schema)
        .with_mode(ValidationMode::CollectAll)
        .check(template);
    assert!(
        outcome.is_valid(),
        "template should validate, but found:\n{}",
        outcome
            .issues
            .iter()
            .map(|issue| format!("{}: {}", issue.node, issue.error))
            .collect::<Vec<_>>()
            .join("\n")
    );
    assert!(TemplateValidator::new(schema).validate(template));
}

/// Assert that `template` is rejected and the first issue has `kind`.
pub fn assert_rejected_with(schema: &InMemorySchema, template: &Template, kind: ValidationErrorKind) {
    let validator = TemplateValidator::new(schema);
    assert!(!validator.validate(template), "template should be rejected");
    let outcome = validator.check(template);
    let first = outcome.issues.first().map(|issue| issue.kind());
    assert_eq!(first, Some(kind), "unexpected issues: {:?}", outcome.issues);
}
