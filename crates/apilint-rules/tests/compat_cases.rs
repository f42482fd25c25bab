//! Integration test: before/after dump pairs end-to-end via Analyzer.
//!
//! Uses fixture files under `tests/fixtures/` named `<case>.before.txt` and
//! `<case>.after.txt` to verify that parsing, diffing, the compatibility
//! table and the structural rules together produce the expected exit code
//! and findings.

use apilint_core::{parse_str, Analyzer, ApiModel, LintReport, ResultJson};
use apilint_rules::{all_rules, COMPAT_RULES};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(case: &str, side: &str) -> ApiModel {
    let path = fixture_root().join(format!("{case}.{side}.txt"));
    let content = std::fs::read_to_string(&path).expect("fixture should exist");
    parse_str(&path.display().to_string(), &content).expect("fixture should parse")
}

fn run(case: &str) -> LintReport {
    let mut builder = Analyzer::builder()
        .after(load(case, "after"))
        .before(Some(load(case, "before")))
        .compat_rules(COMPAT_RULES);
    for rule in all_rules() {
        builder = builder.rule_box(rule);
    }
    builder.build().expect("analyzer should build").analyze()
}

fn codes(findings: &[apilint_core::Finding]) -> Vec<&str> {
    findings.iter().map(|f| f.code.as_str()).collect()
}

// ── Incompatible: exactly one compat failure, no structural failures ──

const INCOMPATIBLE: &[(&str, &str)] = &[
    ("test-removed-class", "C1"),
    ("test-removed-method", "C1"),
    ("test-removed-package", "C1"),
    ("test-removed-param", "C7"),
    ("test-changed-return-type", "C2"),
    ("test-changed-final-return-type", "C2"),
    ("test-method-moved-to-child-class", "C4"),
    ("test-ctor-removed", "C1"),
    ("test-field-removed", "C1"),
    ("test-field-value-changed", "C5"),
    ("test-field-type-changed", "C6"),
    ("test-method-renamed", "C1"),
    ("test-annotation-add", "C8"),
    ("test-annotation-remove", "C8"),
    ("test-annotation-remove-ctor", "C8"),
    ("test-annotation-remove-class", "C8"),
    ("test-enum-field-removed", "C9"),
    ("test-parameter-annotation-add", "C8"),
];

#[test]
fn incompatible_cases() {
    for (case, code) in INCOMPATIBLE {
        let report = run(case);
        let json = report.result_json();
        assert_eq!(report.exit_code(), 131, "{case}");
        assert_eq!(codes(&json.compat_failures), vec![*code], "{case}");
        assert!(json.failures.is_empty(), "{case}");
    }
}

// ── API change: at least one change, nothing breaking ──

const API_CHANGE: &[(&str, &str)] = &[
    ("test-enum-field-added", "A1"),
    ("test-removed-final-modifier-class", "A2"),
    ("test-removed-final-modifier-method", "A2"),
    ("test-added-final-modifier-method", "A3"),
    ("test-method-moved-to-parent-class", "A4"),
    ("test-annotation-add-class", "A6"),
];

#[test]
fn api_change_cases() {
    for (case, code) in API_CHANGE {
        let report = run(case);
        let json = report.result_json();
        assert_eq!(report.exit_code(), 10, "{case}");
        assert!(json.compat_failures.is_empty(), "{case}");
        assert!(codes(&json.api_changes).contains(code), "{case}");
        assert!(!json.failure, "{case}");
    }
}

#[test]
fn moves_yield_exactly_one_item() {
    let up = run("test-method-moved-to-parent-class");
    assert_eq!(up.findings.len(), 1);
    assert_eq!(up.findings[0].element, "org.example.Derived#run()");
    assert_eq!(up.findings[0].message, "moved to supertype `org.example.Base`");

    let down = run("test-method-moved-to-child-class");
    assert_eq!(down.findings.len(), 1);
    assert_eq!(down.findings[0].element, "org.example.Base#run()");
}

#[test]
fn move_between_nested_classes() {
    let report = run("test-method-moved-to-nested-parent-class");
    assert_eq!(report.exit_code(), 10);
    assert_eq!(codes(&report.findings), ["A4"]);
    assert_eq!(report.findings[0].element, "org.example.Outer.Derived#run()");
    assert_eq!(
        report.findings[0].message,
        "moved to supertype `org.example.Outer.Base`"
    );
}

#[test]
fn moved_member_keeps_its_other_changes() {
    let report = run("test-method-moved-to-parent-class-return-type");
    assert_eq!(report.exit_code(), 131);
    assert_eq!(codes(&report.findings), ["A4", "C2"]);
    assert!(report
        .findings
        .iter()
        .all(|f| f.element == "org.example.Derived#run()"));
    assert_eq!(
        report.findings[1].message,
        "return type changed from `void` to `long`"
    );

    let report = run("test-method-moved-to-parent-class-visibility");
    assert_eq!(report.exit_code(), 131);
    assert_eq!(codes(&report.findings), ["A4", "C14"]);
    assert_eq!(
        report.findings[1].message,
        "visibility reduced from public to protected"
    );
}

#[test]
fn parameter_annotation_is_reported_per_parameter() {
    let report = run("test-parameter-annotation-add");
    assert_eq!(report.findings.len(), 1);
    insta::assert_snapshot!(
        report.findings[0].to_string(),
        @"incompatible [C8] org.example.Widget#setLabel(java.lang.String): annotation `@androidx.annotation.Nullable` added to parameter 1 (after:5)"
    );
}

#[test]
fn signature_change_is_a_removed_added_pair() {
    let report = run("test-removed-param");
    assert_eq!(codes(&report.findings), ["A5", "C7"]);
    assert_eq!(report.findings[0].element, "org.example.Widget#resize(int)");
    assert_eq!(
        report.findings[1].location.map(|l| l.to_string()),
        Some("before:6".to_string())
    );
}

// ── Structural errors ──

#[test]
fn fields_only_class() {
    let report = run("test-fields-only-class");
    let json: ResultJson = report.result_json();
    assert_eq!(report.exit_code(), 77);
    assert!(json.failure);
    assert_eq!(codes(&json.failures), ["GV1"]);
    assert_eq!(json.failures[0].element, "org.example.Point");
}

#[test]
fn fields_only_class_final() {
    let report = run("test-fields-only-class-final");
    assert_eq!(report.exit_code(), 77);
    assert_eq!(codes(&report.result_json().failures), ["GV2"]);
}

#[test]
fn noticed_error_does_not_fail() {
    let report = run("test-noticed-fields-only-class");
    let json = report.result_json();
    assert_eq!(report.exit_code(), 0);
    assert!(!json.failure);
    assert_eq!(codes(&json.noticed), ["GV1"]);
}

#[test]
fn duplicate_declaration() {
    let report = run("test-duplicate-method");
    assert_eq!(report.exit_code(), 77);
    let failures = report.result_json().failures;
    assert_eq!(codes(&failures), ["DUP1"]);
    insta::assert_snapshot!(
        failures[0].to_string(),
        @"api error [DUP1] org.example.Widget#size(): duplicate declaration of method `size()` in `org.example.Widget` (after:6)"
    );
}

// ── No change ──

#[test]
fn no_change_cases() {
    for case in ["test-whitespace-change", "test-reoder-class"] {
        let report = run(case);
        assert!(report.findings.is_empty(), "{case}: {:?}", report.findings);
        assert_eq!(report.exit_code(), 0, "{case}");
    }
}

#[test]
fn structural_only_without_baseline() {
    let mut builder = Analyzer::builder()
        .after(load("test-fields-only-class", "after"))
        .compat_rules(COMPAT_RULES);
    for rule in all_rules() {
        builder = builder.rule_box(rule);
    }
    let report = builder.build().expect("analyzer should build").analyze();
    assert!(!report.compared);
    assert_eq!(codes(&report.findings), ["GV1"]);
}
