//! Reading JSON templates and validating them against the GeoSciML schema.

mod common;

use feature_template::ast::TemplateNode;
use feature_template::error::{TemplateError, ValidationErrorKind};
use feature_template::parser::read_template;
use feature_template::semantic::{InMemorySchema, TemplateValidator, ValidationMode};
use feature_template::validate;

use common::station_schema;

const MAPPED_FEATURE: &str = r#"{
    "@context": {
        "gsml": "urn:cgi:xmlns:CGI:GeoSciML:2.0",
        "gml": "http://www.opengis.net/gml/3.2"
    },
    "type": "FeatureCollection",
    "features": [
        {
            "$source": "gsml:MappedFeature",
            "@id": "${@id}",
            "name": "${gml:name}",
            "positionalAccuracy": {
                "value": "${gsml:positionalAccuracy/gsml:principalValue}",
                "uom": "${gsml:positionalAccuracy/gsml:uom}"
            },
            "geometry": {
                "@type": "Polygon",
                "wkt": "$${toWKT(gsml:shape)}"
            },
            "unit": {
                "$source": "gsml:specification",
                "description": "$${strConcat(gml:name, strConcat(' - ', gml:description))}",
                "purpose": "${gsml:purpose}",
                "feature": "${../gml:name}",
                "composition": [
                    {
                        "$source": "gsml:composition",
                        "role": "${gsml:role}",
                        "proportion": "${gsml:proportion/gsml:value}",
                        "lithology": [
                            {
                                "$source": "gsml:lithology",
                                "name": "${gml:name}",
                                "vocabulary": "${gsml:vocabulary}",
                                "unitName": "${../../gml:name}"
                            }
                        ]
                    }
                ]
            }
        }
    ]
}"#;

fn rejection(source: &str) -> (ValidationErrorKind, String) {
    let schema = InMemorySchema::example();
    let template = read_template(source).expect("template should read");
    let outcome = TemplateValidator::new(&schema).check(&template);
    let issue = outcome.issues.first().expect("template should be rejected");
    (issue.kind(), issue.node.to_string())
}

#[test]
fn test_mapped_feature_template_validates() {
    let schema = InMemorySchema::example();
    let template = read_template(MAPPED_FEATURE).expect("template should read");
    assert!(validate(&template, &schema));
}

#[test]
fn test_static_content_is_kept_static() {
    let template = read_template(MAPPED_FEATURE).expect("template should read");
    let keys: Vec<_> = template
        .root
        .children
        .iter()
        .map(|node| (node.key().unwrap_or_default().to_string(), matches!(node, TemplateNode::Static(_))))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("@context".to_string(), true),
            ("type".to_string(), true),
            ("features".to_string(), false),
        ]
    );
}

#[test]
fn test_misspelled_attribute_is_located() {
    let source = MAPPED_FEATURE.replace("${gsml:purpose}", "${gsml:porpose}");
    assert_eq!(
        rejection(&source),
        (ValidationErrorKind::PathNotFound, "/features/0/unit/purpose".to_string())
    );
}

#[test]
fn test_ascent_past_feature_is_rejected() {
    let source = MAPPED_FEATURE.replace("${../../gml:name}", "${../../../../gml:name}");
    assert_eq!(
        rejection(&source).0,
        ValidationErrorKind::ScopeUnderflow
    );
}

#[test]
fn test_short_function_call_is_rejected() {
    let source = MAPPED_FEATURE.replace("$${toWKT(gsml:shape)}", "$${strReplace(gsml:shape, 'a')}");
    assert_eq!(
        rejection(&source),
        (ValidationErrorKind::ArityError, "/features/0/geometry/wkt".to_string())
    );
}

#[test]
fn test_collect_all_reports_each_broken_entry() {
    let source = MAPPED_FEATURE
        .replace("${gsml:role}", "${gsml:rol}")
        .replace("${gml:name}\",\n            \"positionalAccuracy", "${gml:nam}\",\n            \"positionalAccuracy");
    let schema = InMemorySchema::example();
    let template = read_template(&source).expect("template should read");
    let outcome = TemplateValidator::new(&schema)
        .with_mode(ValidationMode::CollectAll)
        .check(&template);
    let nodes: Vec<_> = outcome.issues.iter().map(|issue| issue.node.to_string()).collect();
    assert_eq!(
        nodes,
        vec!["/features/0/name", "/features/0/unit/composition/0/role"]
    );
}

#[test]
fn test_condition_issue_keeps_expression_text() {
    let source = MAPPED_FEATURE.replace("$${toWKT(gsml:shape)}", "$${toWKT(gsml:outline)}");
    let schema = InMemorySchema::example();
    let template = read_template(&source).expect("template should read");
    let outcome = TemplateValidator::new(&schema).check(&template);
    let issue = &outcome.issues[0];
    assert_eq!(issue.source.as_deref(), Some("toWKT(gsml:outline)"));
    assert_eq!(issue.span, Some(6..18));
    let report = format!("{:?}", issue.to_report());
    assert!(report.contains("gsml:outline"), "report should show the condition: {report}");
}

#[test]
fn test_each_sourced_array_element_resolves_in_enclosing_scope() {
    let schema = station_schema();
    let template = read_template(
        r#"{
            "items": [
                { "$source": "members", "c": "${code}" },
                { "$source": "members", "l": "${label}", "station": "${../name}" }
            ]
        }"#,
    )
    .expect("template should read");
    assert!(validate(&template, &schema));

    let broken = read_template(
        r#"{ "items": [ { "$source": "members", "c": "${code}" }, { "$source": "name", "x": "${code}" } ] }"#,
    )
    .expect("template should read");
    let outcome = TemplateValidator::new(&schema).check(&broken);
    assert_eq!(outcome.issues[0].kind(), ValidationErrorKind::PathNotFound);
    assert_eq!(outcome.issues[0].node.to_string(), "/items/1/x");
}

#[test]
fn test_unresolvable_source_is_rejected() {
    let source = MAPPED_FEATURE.replace("\"gsml:specification\"", "\"gsml:specifcation\"");
    assert_eq!(
        rejection(&source),
        (ValidationErrorKind::PathNotFound, "/features/0/unit".to_string())
    );
}

// ==================== Reader errors ====================

#[test]
fn test_root_must_be_object() {
    assert!(matches!(read_template("[1, 2]"), Err(TemplateError::RootNotObject)));
}

#[test]
fn test_invalid_json_is_reported() {
    assert!(matches!(read_template("{ \"a\": "), Err(TemplateError::Json(_))));
}

#[test]
fn test_source_must_be_string() {
    let error = read_template(r#"{ "x": { "$source": 3, "a": "${name}" } }"#).unwrap_err();
    assert!(matches!(error, TemplateError::InvalidSource { ref path } if path == "/x"));
}

#[test]
fn test_unterminated_expression() {
    let error = read_template(r#"{ "x": "${name" }"#).unwrap_err();
    assert!(matches!(error, TemplateError::UnterminatedExpression { .. }));
    assert!(error.to_string().contains("/x"));
}
