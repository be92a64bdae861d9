use enclosing_context_rs::{EnclosingContext, LineRange, SourceAnalyzer, SourceParser};
use serde::Deserialize;

const VECTOR_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/enclosing-context-vectors.json"
));

#[derive(Deserialize)]
struct VectorFile {
    version: String,
    sources: Vec<SourceVector>,
}

#[derive(Deserialize)]
struct SourceVector {
    id: String,
    content: String,
    cases: Vec<ContextCase>,
}

#[derive(Deserialize)]
struct ContextCase {
    name: String,
    range: LineRange,
    expected: Option<EnclosingContext>,
}

fn load_vectors() -> VectorFile {
    let vectors: VectorFile = serde_json::from_str(VECTOR_JSON).expect("parse vectors");
    assert_eq!(vectors.version, "1");
    vectors
}

#[test]
fn enclosing_context_vectors_match() {
    let analyzer = SourceAnalyzer::python();

    for source in load_vectors().sources {
        assert!(
            analyzer.dry_run(&source.content).valid,
            "source {} should parse cleanly",
            source.id
        );

        for case in source.cases {
            let context = analyzer.find_enclosing_context(&source.content, case.range.clone());
            assert_eq!(
                context, case.expected,
                "source {} case {}",
                source.id, case.name
            );
        }
    }
}

#[test]
fn batch_lookup_matches_vectors() {
    let analyzer = SourceAnalyzer::python();

    for source in load_vectors().sources {
        let ranges: Vec<LineRange> = source.cases.iter().map(|case| case.range.clone()).collect();
        let contexts = analyzer.find_enclosing_contexts(&source.content, &ranges);
        let expected: Vec<Option<EnclosingContext>> =
            source.cases.into_iter().map(|case| case.expected).collect();
        assert_eq!(contexts, expected, "source {}", source.id);
    }
}

#[test]
fn dry_run_reports_missing_colon() {
    let analyzer = SourceAnalyzer::python();

    let valid = analyzer.dry_run("def f():\n    return 42");
    assert!(valid.valid);
    assert!(valid.error.is_empty());

    let invalid = analyzer.dry_run("def f()\n    return 42");
    assert!(!invalid.valid);
    assert!(!invalid.error.is_empty());
    assert!(invalid.error_position.is_some());
}

#[test]
fn repeated_calls_are_identical() {
    let analyzer = SourceAnalyzer::python();
    let content = "def f():\n    if a > b:\n        swap()\n";
    let range = LineRange { start: 3, end: 3 };

    assert_eq!(
        analyzer.find_enclosing_context(content, range.clone()),
        analyzer.find_enclosing_context(content, range)
    );
    assert_eq!(analyzer.dry_run(content), analyzer.dry_run(content));
}
