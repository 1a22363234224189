//! Integration tests for the per-project convergence loop.

use std::path::PathBuf;

use structfix::engine::{ConvergenceDriver, ProjectStatus};
use structfix::rules::RuleSet;
use structfix::syntax::{Semantics, SourceTree};
use structfix::workspace::{Document, Project};
use structfix::Config;

fn doc(rel: &str, src: &str) -> Document {
    Document {
        rel: rel.to_string(),
        path: PathBuf::from(rel),
        tree: SourceTree::parse(src.to_string()).unwrap(),
    }
}

fn converge(project: Project) -> (Project, structfix::ProjectOutcome) {
    let rules = RuleSet::all();
    let config = Config::default();
    let driver = ConvergenceDriver::new(&rules, &config);
    driver.converge(project, |_| {})
}

#[test]
fn test_clean_project_is_done_with_no_fixes() {
    let project = Project {
        name: "Clean".to_string(),
        documents: vec![doc(
            "A.cs",
            "class A\n{\n    const int K = 1;\n\n    public void M() {}\n}\n",
        )],
    };
    let (_, outcome) = converge(project);
    assert_eq!(outcome.status, ProjectStatus::Done);
    assert_eq!(outcome.fixes, 0);
    assert_eq!(outcome.errors, 0);
}

#[test]
fn test_fixes_accumulate_across_passes_until_done() {
    // One document with two different violations: member order and enum
    // values. Only one fix lands per document per pass, so convergence
    // takes multiple passes.
    let project = Project {
        name: "Mixed".to_string(),
        documents: vec![doc(
            "A.cs",
            r#"
class A
{
    public void M() {}
    const int K = 1;
}

enum Color
{
    Red,
    Green
}
"#,
        )],
    };
    let (fixed, outcome) = converge(project);
    assert_eq!(outcome.status, ProjectStatus::Done);
    assert_eq!(outcome.fixes, 2);
    let text = fixed.documents[0].text();
    assert!(text.contains("Red = 1"));
    assert!(text.contains("Green = 2"));
    let k = text.find("const int K").unwrap();
    let m = text.find("public void M").unwrap();
    assert!(k < m);
}

#[test]
fn test_each_document_gets_one_fix_per_pass() {
    // Two documents, one violation each: both are fixed within a single
    // pass, so the whole project converges with two fixes.
    let project = Project {
        name: "Two".to_string(),
        documents: vec![
            doc("A.cs", "enum E { A, B }"),
            doc("B.cs", "enum F { C, D }"),
        ],
    };
    let (fixed, outcome) = converge(project);
    assert_eq!(outcome.status, ProjectStatus::Done);
    assert_eq!(outcome.fixes, 2);
    assert!(fixed.documents[0].text().contains("A = 1"));
    assert!(fixed.documents[1].text().contains("C = 1"));
}

#[test]
fn test_async_rename_propagates_to_call_sites() {
    let project = Project {
        name: "Rename".to_string(),
        documents: vec![
            doc(
                "Service.cs",
                "class Service\n{\n    public Task Run()\n    {\n        return null;\n    }\n}\n",
            ),
            doc(
                "Caller.cs",
                "class Caller\n{\n    void Go(Service s)\n    {\n        s.Run();\n    }\n}\n",
            ),
        ],
    };
    let (fixed, outcome) = converge(project);
    assert_eq!(outcome.status, ProjectStatus::Done);
    assert_eq!(outcome.fixes, 1);
    assert!(fixed.documents[0].text().contains("public Task RunAsync()"));
    assert!(fixed.documents[1].text().contains("s.RunAsync();"));
}

#[test]
fn test_unparseable_document_stalls_with_errors() {
    let project = Project {
        name: "Broken".to_string(),
        documents: vec![doc("Broken.cs", "class C {\n")],
    };
    let (_, outcome) = converge(project);
    assert_eq!(outcome.status, ProjectStatus::StalledWithErrors);
    assert_eq!(outcome.fixes, 0);
    assert!(outcome.errors > 0);
}

#[test]
fn test_errors_do_not_block_fixable_warnings() {
    let project = Project {
        name: "Partial".to_string(),
        documents: vec![
            doc("Broken.cs", "class C {\n"),
            doc("Fixable.cs", "enum E { A, B }"),
        ],
    };
    let (fixed, outcome) = converge(project);
    assert_eq!(outcome.status, ProjectStatus::StalledWithErrors);
    assert_eq!(outcome.fixes, 1);
    assert!(fixed.documents[1].text().contains("A = 1"));
}

#[test]
fn test_advisory_violation_does_not_stall_or_loop() {
    // enum_without_zero has no fixer; the project still reaches Done.
    let project = Project {
        name: "Advisory".to_string(),
        documents: vec![doc("A.cs", "enum E { None = 0, A = 1 }")],
    };
    let (fixed, outcome) = converge(project);
    assert_eq!(outcome.status, ProjectStatus::Done);
    assert_eq!(outcome.fixes, 0);

    // The advisory diagnostic is still reported by analysis.
    let rules = RuleSet::all();
    let config = Config::default();
    let driver = ConvergenceDriver::new(&rules, &config);
    let sem = Semantics::build(fixed.documents.iter().map(|d| &d.tree));
    let diags = driver.analyze_project(&fixed, &sem);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].rule.as_str(), "enum_without_zero");
}

#[test]
fn test_convergence_is_a_fixed_point() {
    let project = Project {
        name: "Twice".to_string(),
        documents: vec![doc(
            "A.cs",
            "class A\n{\n    public void M() {}\n    int f;\n    const int K = 1;\n}\n",
        )],
    };
    let (fixed_once, first) = converge(project);
    assert!(first.fixes > 0);
    let (_, second) = converge(fixed_once);
    assert_eq!(second.fixes, 0);
    assert_eq!(second.status, ProjectStatus::Done);
}
