//! Concurrent validation against a shared schema.

mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use feature_template::semantic::{SchemaProvider, TemplateValidator};

#[test]
fn test_parallel_validation_shares_schema() {
    let schema: Arc<dyn SchemaProvider> = Arc::new(station_schema());
    let valid = Arc::new(template(vec![
        value("name", "name"),
        members_scope(vec![value("code", "code"), value("station", "../name")]),
    ]));
    let invalid = Arc::new(template(vec![members_scope(vec![value("name", "name")])]));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let schema = Arc::clone(&schema);
            let template = if i % 2 == 0 { Arc::clone(&valid) } else { Arc::clone(&invalid) };
            thread::spawn(move || {
                let validator = TemplateValidator::new(schema.as_ref());
                (0..50).all(|_| validator.validate(&template) == (i % 2 == 0))
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().expect("validation thread panicked"));
    }
}

#[test]
fn test_scoped_threads_validate_branches() {
    let schema = station_schema();
    let branches = vec![
        template(vec![value("name", "name")]),
        template(vec![value("elevation", "elevation")]),
        template(vec![members_scope(vec![value("label", "label")])]),
    ];

    let results: Vec<bool> = thread::scope(|scope| {
        let handles: Vec<_> = branches
            .iter()
            .map(|branch| {
                let schema = &schema;
                scope.spawn(move || TemplateValidator::new(schema).validate(branch))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("validation thread panicked"))
            .collect()
    });

    assert_eq!(results, vec![true, true, true]);
}
