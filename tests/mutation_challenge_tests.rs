mod common;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use common::{FakeDiff, mutation};
use fastrand::Rng;
use pretty_assertions::assert_eq;
use questline::core::reports::mutation::load_mutations;
use questline::core::snippet::{code_snippet, lines_in_range};
use questline::types::{ClassDetails, MutationRecord};
use questline::{
    Challenge, ChallengeLifecycle, ChallengeState, EvaluationContext, MutationChallenge,
    MutationReport, ReportSnapshot,
};
use tempfile::tempdir;

const CLASS: &str = "org.example.Feature";

const MOCO_JSON: &str = r#"{
  "org.example.Feature": [
    {
      "mutationDetails": {
        "methodInfo": {
          "className": "org/example/Feature",
          "methodName": "foo",
          "methodDescription": "(Ljava/lang/Integer;)Ljava/lang/Integer;"
        },
        "instructionIndices": [30, 31],
        "mutationOperatorName": "ROR",
        "mutatorID": "IF_ICMPGT-IF_ICMPLT-50",
        "fileName": "Feature.java",
        "loc": 50,
        "mutationDescription": "Replace > with <",
        "instructionsOrder": ["30", "31"],
        "additionalInfo": {"condition": "true"}
      },
      "result": "survived",
      "uniqueID": 1
    },
    {
      "mutationDetails": {
        "methodInfo": {
          "className": "org/example/Feature",
          "methodName": "bar",
          "methodDescription": "()V"
        },
        "mutationOperatorName": "AOR",
        "mutatorID": "IADD-ISUB",
        "fileName": "Feature.java",
        "loc": 12,
        "mutationDescription": "Replace + with -"
      },
      "result": "killed",
      "uniqueID": 2
    }
  ]
}"#;

fn annotated_source(lines: usize) -> String {
    let body: Vec<String> = (1..=lines)
        .map(|n| format!("<span class=\"nc\" id=\"L{n}\">int x{n} = a &lt; b;</span>"))
        .collect();
    format!(
        "<html><body><pre class=\"source lang-java linenums\">{}</pre></body></html>",
        body.join("\n")
    )
}

fn class_details(workspace: &Path) -> ClassDetails {
    ClassDetails {
        package_name: "org.example".to_string(),
        class_name: "Feature".to_string(),
        workspace: workspace.to_path_buf(),
        annotated_source: workspace.join("target/site/jacoco/org.example/Feature.java.html"),
    }
}

fn write_annotated(workspace: &Path, lines: usize) {
    let path = workspace.join("target/site/jacoco/org.example/Feature.java.html");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, annotated_source(lines)).unwrap();
}

fn report_with(records: Vec<MutationRecord>) -> MutationReport {
    MutationReport {
        entries: BTreeMap::from([(CLASS.to_string(), records)]),
    }
}

fn bound(workspace: &Path, record: MutationRecord) -> MutationChallenge {
    MutationChallenge::new(
        record,
        class_details(workspace),
        Some("main".to_string()),
        workspace,
        "abc123",
    )
}

#[test]
fn parses_moco_report() {
    let report = MutationReport::from_slice(MOCO_JSON.as_bytes()).unwrap();
    assert_eq!(report.len(), 2);

    let records = report.for_class(CLASS);
    assert_eq!(records[0].mutation_details.class_name(), CLASS);
    assert_eq!(records[0].mutation_details.method_name(), "foo");
    assert_eq!(records[0].mutation_details.mutator_id, "IF_ICMPGT-IF_ICMPLT-50");
    assert_eq!(records[0].mutation_details.instruction_indices, vec![30, 31]);
    assert!(!records[0].is_killed());
    assert!(records[1].is_killed());
    assert!(records[1].mutation_details.instruction_indices.is_empty());

    assert!(report.for_class("org.example.Other").is_empty());
}

#[test]
fn unusable_report_loads_as_none() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("moco.json");
    assert!(load_mutations(&path).is_none());
    fs::write(&path, "{ not json").unwrap();
    assert!(load_mutations(&path).is_none());
    fs::write(&path, MOCO_JSON).unwrap();
    assert_eq!(load_mutations(&path).unwrap().len(), 2);
}

#[test]
fn generate_picks_a_survivor() {
    let tmp = tempdir().unwrap();
    write_annotated(tmp.path(), 60);
    let report = MutationReport::from_slice(MOCO_JSON.as_bytes()).unwrap();

    for seed in 0..10 {
        let challenge = MutationChallenge::generate(
            &report,
            class_details(tmp.path()),
            Some("main".to_string()),
            tmp.path(),
            "abc123",
            &mut Rng::with_seed(seed),
        )
        .unwrap();
        assert_eq!(challenge.unique_id(), 1);
        assert_eq!(challenge.line_of_code(), 50);
        assert_eq!(challenge.commit_id(), "abc123");
        assert_eq!(challenge.branch(), Some("main"));
        assert!(!challenge.record().is_solved());
    }
}

#[test]
fn generate_without_survivors_yields_none() {
    let tmp = tempdir().unwrap();
    let report = report_with(vec![mutation(CLASS, "foo", 5, "d", 9, "killed")]);
    let challenge = MutationChallenge::generate(
        &report,
        class_details(tmp.path()),
        None,
        tmp.path(),
        "abc123",
        &mut Rng::with_seed(0),
    );
    assert!(challenge.is_none());

    let other_class = MutationChallenge::generate(
        &MutationReport::default(),
        class_details(tmp.path()),
        None,
        tmp.path(),
        "abc123",
        &mut Rng::with_seed(0),
    );
    assert!(other_class.is_none());
}

#[test]
fn killed_by_unique_id() {
    let tmp = tempdir().unwrap();
    let diff = FakeDiff::unchanged();
    let challenge = bound(tmp.path(), mutation(CLASS, "foo", 50, "Replace > with <", 1, "survived"));

    // Same id, everything else moved.
    let reports = ReportSnapshot {
        cycles: None,
        mutations: Some(report_with(vec![mutation(CLASS, "foo", 53, "other", 1, "killed")])),
    };
    let ctx = EvaluationContext::new(tmp.path(), &reports, &diff);
    assert!(challenge.check_solved(&ctx));
}

#[test]
fn killed_by_site() {
    let tmp = tempdir().unwrap();
    let diff = FakeDiff::unchanged();
    let challenge = bound(tmp.path(), mutation(CLASS, "foo", 50, "Replace > with <", 1, "survived"));

    let reports = ReportSnapshot {
        cycles: None,
        mutations: Some(report_with(vec![mutation(
            CLASS,
            "foo",
            50,
            "Replace > with <",
            77,
            "killed",
        )])),
    };
    let ctx = EvaluationContext::new(tmp.path(), &reports, &diff);
    assert!(challenge.check_solved(&ctx));
}

#[test]
fn still_surviving_or_unrelated_is_not_solved() {
    let tmp = tempdir().unwrap();
    let diff = FakeDiff::unchanged();
    let challenge = bound(tmp.path(), mutation(CLASS, "foo", 50, "Replace > with <", 1, "survived"));

    let reports = ReportSnapshot {
        cycles: None,
        mutations: Some(report_with(vec![
            mutation(CLASS, "foo", 50, "Replace > with <", 1, "survived"),
            mutation(CLASS, "foo", 51, "Replace > with <", 2, "killed"),
            mutation(CLASS, "baz", 50, "Replace > with <", 3, "killed"),
        ])),
    };
    let ctx = EvaluationContext::new(tmp.path(), &reports, &diff);
    assert!(!challenge.check_solved(&ctx));

    let empty = ReportSnapshot::default();
    let ctx = EvaluationContext::new(tmp.path(), &empty, &diff);
    assert!(!challenge.check_solved(&ctx));
}

#[test]
fn changed_class_makes_challenge_unsolvable() {
    let tmp = tempdir().unwrap();
    let challenge = bound(tmp.path(), mutation(CLASS, "foo", 50, "d", 1, "survived"));
    let reports = ReportSnapshot::default();

    let diff = FakeDiff::with(Some(vec![CLASS.to_string()]));
    let ctx = EvaluationContext::new(tmp.path(), &reports, &diff);
    assert!(!challenge.is_solvable(&ctx));
    assert_eq!(
        diff.calls.lock().unwrap().as_slice(),
        &[("abc123".to_string(), "org.example".to_string())]
    );

    let mut wrapped: Challenge = challenge.into();
    assert_eq!(wrapped.evaluate(&ctx), ChallengeState::Unsolvable);
}

#[test]
fn other_changes_keep_challenge_solvable() {
    let tmp = tempdir().unwrap();
    let challenge = bound(tmp.path(), mutation(CLASS, "foo", 50, "d", 1, "survived"));
    let reports = ReportSnapshot::default();

    let diff = FakeDiff::with(Some(vec!["org.example.Helper".to_string()]));
    let ctx = EvaluationContext::new(tmp.path(), &reports, &diff);
    assert!(challenge.is_solvable(&ctx));

    let unknown = FakeDiff::unknown();
    let ctx = EvaluationContext::new(tmp.path(), &reports, &unknown);
    assert!(challenge.is_solvable(&ctx));
}

#[test]
fn solved_wins_over_changed_class() {
    let tmp = tempdir().unwrap();
    let mut challenge: Challenge =
        bound(tmp.path(), mutation(CLASS, "foo", 50, "d", 1, "survived")).into();
    let reports = ReportSnapshot {
        cycles: None,
        mutations: Some(report_with(vec![mutation(CLASS, "foo", 50, "d", 1, "killed")])),
    };
    let diff = FakeDiff::with(Some(vec![CLASS.to_string()]));
    let ctx = EvaluationContext::new(tmp.path(), &reports, &diff);
    assert_eq!(challenge.evaluate(&ctx), ChallengeState::Solved);
    assert!(challenge.solved() >= challenge.created());
}

#[test]
fn equality_ignores_result() {
    let tmp = tempdir().unwrap();
    let survived = bound(tmp.path(), mutation(CLASS, "foo", 50, "d", 1, "survived"));
    let killed = bound(tmp.path(), mutation(CLASS, "foo", 50, "d", 1, "killed"));
    let other_line = bound(tmp.path(), mutation(CLASS, "foo", 51, "d", 1, "survived"));
    assert_eq!(survived, killed);
    assert_ne!(survived, other_line);
}

#[test]
fn snippet_surrounds_the_mutated_line() {
    let tmp = tempdir().unwrap();
    write_annotated(tmp.path(), 60);
    let challenge = bound(tmp.path(), mutation(CLASS, "foo", 50, "d", 1, "survived"));

    let snippet = challenge.snippet();
    assert!(snippet.starts_with("<pre class='prettyprint linenums:48 mt-2'><code class='language-java'>"));
    assert!(snippet.contains("int x48 = a &lt; b;"));
    assert!(snippet.contains("int x52 = a &lt; b;"));
    assert!(!snippet.contains("x47 "));
    assert!(!snippet.contains("x53 "));
    assert!(!snippet.contains("<span"));
    assert_eq!(challenge.file_name(), "Feature.java");
}

#[test]
fn snippet_is_clamped_at_file_edges() {
    let (first, text) = lines_in_range(&annotated_source(3), 1).unwrap();
    assert_eq!(first, 1);
    assert_eq!(text.lines().count(), 3);

    let (first, text) = lines_in_range(&annotated_source(10), 10).unwrap();
    assert_eq!(first, 8);
    assert_eq!(text.lines().count(), 3);

    assert!(lines_in_range(&annotated_source(10), 11).is_none());
}

#[test]
fn missing_snippet_blanks_file_name() {
    let tmp = tempdir().unwrap();
    let challenge = bound(tmp.path(), mutation(CLASS, "foo", 50, "d", 1, "survived"));
    assert_eq!(challenge.snippet(), "");
    assert_eq!(challenge.file_name(), "");

    write_annotated(tmp.path(), 60);
    let path = class_details(tmp.path()).annotated_source;
    assert_eq!(code_snippet(&path, -1), "");
    assert_eq!(code_snippet(&path, 61), "");
}

#[test]
fn annotated_source_follows_a_moved_workspace() {
    let old = tempdir().unwrap();
    let new = tempdir().unwrap();
    write_annotated(new.path(), 20);

    let challenge = MutationChallenge::new(
        mutation(CLASS, "foo", 10, "d", 1, "survived"),
        class_details(old.path()),
        None,
        new.path(),
        "abc123",
    );
    assert!(challenge.snippet().contains("int x10 = a &lt; b;"));
}

#[test]
fn describes_itself() {
    let tmp = tempdir().unwrap();
    let challenge = bound(tmp.path(), mutation(CLASS, "foo", 50, "Replace > with <", 1, "survived"));
    assert_eq!(challenge.name(), "Mutation Test");
    assert_eq!(challenge.score(), 4);
    let text = challenge.to_string();
    assert!(text.contains("Replace > with <"));
    assert!(text.contains("line 50"));
    assert!(text.contains("Feature"));
    assert!(text.contains("org.example"));
}
