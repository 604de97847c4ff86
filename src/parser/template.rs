//! Reader for JSON template documents.
//!
//! Dynamic content is marked inside JSON strings: `"${path}"` produces a
//! path leaf and `"$${expression}"` a condition leaf. Objects carrying a
//! `"$source"` key open a scope over that attribute. Inside arrays, every
//! object element with a `"$source"` is a repeating scope of its own; an
//! array with dynamic content but no sourced element is a repeating scope
//! without a source.

use crate::ast::expression::PathExpression;
use crate::ast::template::{
    ConditionExpression, LeafValue, NodePath, ScopeNode, SourceExpression, StaticNode, Template,
    TemplateNode, ValueLeaf,
};
use crate::error::TemplateError;
use crate::parser::expression::parse_expression;
use serde_json::{Map, Value};
use smol_str::SmolStr;

/// Key that names the source attribute of a scope.
pub const SOURCE_KEY: &str = "$source";

const PATH_OPEN: &str = "${";
const CONDITION_OPEN: &str = "$${";

/// Reads a template document.
pub fn read_template(text: &str) -> Result<Template, TemplateError> {
    let document: Value = serde_json::from_str(text)?;
    template_from_value(&document)
}

/// Builds a template from an already parsed JSON document.
pub fn template_from_value(document: &Value) -> Result<Template, TemplateError> {
    let Value::Object(entries) = document else {
        return Err(TemplateError::RootNotObject);
    };
    let root = NodePath::root();
    let children = read_entries(entries, &root)?;
    tracing::debug!(entries = children.len(), "template read");
    Ok(Template::new(children))
}

fn read_entries(entries: &Map<String, Value>, path: &NodePath) -> Result<Vec<TemplateNode>, TemplateError> {
    entries
        .iter()
        .filter(|(key, _)| key.as_str() != SOURCE_KEY)
        .map(|(key, value)| read_node(Some(SmolStr::new(key)), value, path.child(key)))
        .collect()
}

fn read_node(key: Option<SmolStr>, value: &Value, path: NodePath) -> Result<TemplateNode, TemplateError> {
    match value {
        Value::String(text) => read_string(key, text, path),
        Value::Object(entries) => read_object(key, entries, path),
        Value::Array(items) => read_array(key, items, value, path),
        other => Ok(static_node(key, path, other)),
    }
}

fn read_string(key: Option<SmolStr>, text: &str, path: NodePath) -> Result<TemplateNode, TemplateError> {
    let (open, condition) = if text.starts_with(CONDITION_OPEN) {
        (CONDITION_OPEN, true)
    } else if text.starts_with(PATH_OPEN) {
        (PATH_OPEN, false)
    } else {
        return Ok(static_node(key, path, &Value::String(text.to_string())));
    };

    let Some(inner) = text[open.len()..].strip_suffix('}') else {
        return Err(TemplateError::UnterminatedExpression {
            path: path.to_string(),
        });
    };
    let inner = inner.trim();

    let value = if condition {
        let expression = parse_expression(inner).into_expression(inner);
        LeafValue::Condition(ConditionExpression::new(inner, expression))
    } else {
        LeafValue::Path(PathExpression::new(inner))
    };
    Ok(TemplateNode::Value(ValueLeaf { key, path, value }))
}

fn read_object(
    key: Option<SmolStr>,
    entries: &Map<String, Value>,
    path: NodePath,
) -> Result<TemplateNode, TemplateError> {
    let source = source_of(entries, &path)?;
    if source.is_none() && !entries.values().any(is_dynamic) {
        return Ok(static_node(key, path, &Value::Object(entries.clone())));
    }
    let children = read_entries(entries, &path)?;
    Ok(TemplateNode::Scope(ScopeNode {
        key,
        path,
        source,
        repeating: false,
        children,
    }))
}

fn read_array(
    key: Option<SmolStr>,
    items: &[Value],
    whole: &Value,
    path: NodePath,
) -> Result<TemplateNode, TemplateError> {
    if !is_dynamic(whole) {
        return Ok(static_node(key, path, whole));
    }

    let sourced = items
        .iter()
        .any(|item| matches!(item, Value::Object(entries) if entries.contains_key(SOURCE_KEY)));
    let children = read_items(items, &path)?;
    // Without a sourced element the array itself is an unanchored repeating
    // scope, which the walker rejects.
    Ok(TemplateNode::Scope(ScopeNode {
        key,
        path,
        source: None,
        repeating: !sourced,
        children,
    }))
}

/// Reads array elements. Each element carrying a `$source` becomes its own
/// repeating scope, resolved against the array's enclosing scope.
fn read_items(items: &[Value], path: &NodePath) -> Result<Vec<TemplateNode>, TemplateError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let item_path = path.child(index);
            match item {
                Value::Object(entries) if entries.contains_key(SOURCE_KEY) => {
                    let source = source_of(entries, &item_path)?;
                    let children = read_entries(entries, &item_path)?;
                    Ok(TemplateNode::Scope(ScopeNode {
                        key: None,
                        path: item_path,
                        source,
                        repeating: true,
                        children,
                    }))
                }
                other => read_node(None, other, item_path),
            }
        })
        .collect()
}

fn source_of(entries: &Map<String, Value>, path: &NodePath) -> Result<Option<SourceExpression>, TemplateError> {
    match entries.get(SOURCE_KEY) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(SourceExpression::new(text.trim()))),
        Some(_) => Err(TemplateError::InvalidSource {
            path: path.to_string(),
        }),
    }
}

fn is_dynamic(value: &Value) -> bool {
    match value {
        Value::String(text) => text.starts_with(PATH_OPEN) || text.starts_with(CONDITION_OPEN),
        Value::Object(entries) => entries.contains_key(SOURCE_KEY) || entries.values().any(is_dynamic),
        Value::Array(items) => items.iter().any(is_dynamic),
        _ => false,
    }
}

fn static_node(key: Option<SmolStr>, path: NodePath, value: &Value) -> TemplateNode {
    TemplateNode::Static(StaticNode {
        key,
        path,
        value: value.clone(),
    })
}
