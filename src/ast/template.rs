//! Template builder tree.
//!
//! A template is a tree of scopes and value leaves rooted at the feature
//! type being encoded. Scopes optionally carry a `$source` path that moves
//! the addressing context into a nested attribute; value leaves carry the
//! expression that produces a field value.

use crate::ast::expression::{Expression, PathExpression};
use smol_str::SmolStr;
use std::fmt;

/// Location of a node in the template, as the `/`-joined trail of keys and
/// array indices from the root (`""` for the root itself).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(String);

impl NodePath {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Returns the path of a child reached through `step`.
    pub fn child(&self, step: impl fmt::Display) -> Self {
        Self(format!("{}/{}", self.0, step))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// A complete template, bound to the feature type it was written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub root: RootNode,
}

impl Template {
    pub fn new(children: Vec<TemplateNode>) -> Self {
        Self {
            root: RootNode { children },
        }
    }

    /// Counts every node below the root.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[TemplateNode]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    TemplateNode::Scope(scope) => 1 + count(&scope.children),
                    _ => 1,
                })
                .sum()
        }
        count(&self.root.children)
    }
}

/// The implicit scope over the root feature type. It has no parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootNode {
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    Value(ValueLeaf),
    Scope(ScopeNode),
    Static(StaticNode),
}

impl TemplateNode {
    pub fn path(&self) -> &NodePath {
        match self {
            Self::Value(leaf) => &leaf.path,
            Self::Scope(scope) => &scope.path,
            Self::Static(node) => &node.path,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Value(leaf) => leaf.key.as_deref(),
            Self::Scope(scope) => scope.key.as_deref(),
            Self::Static(node) => node.key.as_deref(),
        }
    }
}

/// A field whose value is computed from the feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueLeaf {
    pub key: Option<SmolStr>,
    pub path: NodePath,
    pub value: LeafValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafValue {
    /// `${...}`: attribute navigation.
    Path(PathExpression),
    /// `$${...}`: condition/function expression.
    Condition(ConditionExpression),
}

/// A parsed `$${...}` expression together with the text it was parsed from.
///
/// Spans inside `expression` index into `text`. Conditions built directly
/// from an [`Expression`] have empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionExpression {
    pub text: SmolStr,
    pub expression: Expression,
}

impl ConditionExpression {
    pub fn new(text: impl Into<SmolStr>, expression: Expression) -> Self {
        Self {
            text: text.into(),
            expression,
        }
    }
}

impl From<Expression> for ConditionExpression {
    fn from(expression: Expression) -> Self {
        Self::new(SmolStr::default(), expression)
    }
}

impl ValueLeaf {
    pub fn path_value(key: impl Into<SmolStr>, path: NodePath, text: impl Into<SmolStr>) -> Self {
        Self {
            key: Some(key.into()),
            path,
            value: LeafValue::Path(PathExpression::new(text)),
        }
    }

    pub fn condition(
        key: impl Into<SmolStr>,
        path: NodePath,
        condition: impl Into<ConditionExpression>,
    ) -> Self {
        Self {
            key: Some(key.into()),
            path,
            value: LeafValue::Condition(condition.into()),
        }
    }
}

/// The `$source` of a scope: the raw text plus its parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceExpression {
    pub text: SmolStr,
    pub path: PathExpression,
}

impl SourceExpression {
    pub fn new(text: impl Into<SmolStr>) -> Self {
        let text = text.into();
        let path = PathExpression::new(text.clone());
        Self { text, path }
    }

    /// The unqualified tail of the source, i.e. everything after the first
    /// `:`. `gsml:MappedFeature` yields `MappedFeature`; text without a
    /// prefix is returned unchanged.
    pub fn type_name(&self) -> &str {
        match self.text.find(':') {
            Some(index) => &self.text[index + 1..],
            None => &self.text,
        }
    }
}

/// A nesting level of the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeNode {
    pub key: Option<SmolStr>,
    pub path: NodePath,
    pub source: Option<SourceExpression>,
    /// Whether the scope iterates a collection (a JSON array).
    pub repeating: bool,
    pub children: Vec<TemplateNode>,
}

impl ScopeNode {
    pub fn new(key: Option<SmolStr>, path: NodePath) -> Self {
        Self {
            key,
            path,
            source: None,
            repeating: false,
            children: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<SmolStr>) -> Self {
        self.source = Some(SourceExpression::new(source));
        self
    }

    pub fn repeating(mut self) -> Self {
        self.repeating = true;
        self
    }

    pub fn with_child(mut self, child: TemplateNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Static content copied verbatim into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticNode {
    pub key: Option<SmolStr>,
    pub path: NodePath,
    pub value: serde_json::Value,
}
