use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use trbx_core::{Column, Dataset};
use trbx_eval::{
    evaluate_quality, write_quality_artifacts, ColumnFailure, QualityMetrics, ReportOptions, Side,
};

fn discrete(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn patients(ages: &[f64], sexes: &[&str]) -> Dataset {
    Dataset::new(vec![Column::numbers("age", ages), Column::labels("sex", sexes)])
        .expect("patients dataset")
}

#[test]
fn identical_columns_score_zero() {
    let real = Dataset::new(vec![Column::numbers("x", &[1.0, 2.0, 3.0, 4.0, 5.0])]).expect("real");
    let report = evaluate_quality(&real, &real.clone(), &BTreeSet::new());

    assert_eq!(report.score("x"), Some(&Ok(0.0)));
    assert_eq!(report.aggregate(), Some(0.0));
}

#[test]
fn disjoint_columns_score_one() {
    let real = Dataset::new(vec![Column::numbers("x", &[0.0, 0.0, 0.0, 0.0])]).expect("real");
    let synthetic =
        Dataset::new(vec![Column::numbers("x", &[100.0, 100.0, 100.0, 100.0])]).expect("synthetic");
    let report = evaluate_quality(&real, &synthetic, &BTreeSet::new());

    assert_eq!(report.score("x"), Some(&Ok(1.0)));
    assert_eq!(report.aggregate(), Some(1.0));
}

#[test]
fn patient_scenario_skips_discrete_columns() {
    let real = patients(&[65.0, 70.0, 80.0, 75.0], &["M", "F", "M", "F"]);
    let synthetic = patients(&[66.0, 69.0, 81.0, 74.0], &["F", "M", "F", "M"]);

    let report = evaluate_quality(&real, &synthetic, &discrete(&["sex"]));

    assert!(!report.contains("sex"));
    assert_eq!(report.columns().len(), 1);
    let age = *report.score("age").expect("age scored");
    let age = age.expect("age available");
    assert!(age > 0.0 && age < 0.5, "unexpected age score {age}");
    assert_eq!(age, 0.25);
    assert_eq!(report.aggregate(), Some(age));
}

#[test]
fn all_columns_discrete_leaves_report_empty() {
    let real = patients(&[65.0, 70.0], &["M", "F"]);
    let report = evaluate_quality(&real, &real.clone(), &discrete(&["age", "sex"]));

    assert!(report.columns().is_empty());
    assert_eq!(report.aggregate(), None);
}

#[test]
fn failing_columns_are_isolated() {
    let real = Dataset::new(vec![
        Column::numbers("age", &[65.0, 70.0, 80.0]),
        Column::numbers("bmi", &[22.0, 27.0, 31.0]),
        Column::numbers("hr", &[60.0, 72.0, 88.0]),
        Column::labels("ward", &["a", "b", "a"]),
    ])
    .expect("real");
    let synthetic = Dataset::new(vec![
        Column::numbers("age", &[65.0, 70.0, 80.0]),
        Column::numeric("hr", vec![None, None, None]),
        Column::labels("ward", &["a", "a", "b"]),
    ])
    .expect("synthetic");

    let report = evaluate_quality(&real, &synthetic, &BTreeSet::new());

    assert_eq!(report.score("age"), Some(&Ok(0.0)));
    assert_eq!(
        report.score("bmi"),
        Some(&Err(ColumnFailure::MissingColumn(Side::Synthetic)))
    );
    assert_eq!(
        report.score("hr"),
        Some(&Err(ColumnFailure::Empty(Side::Synthetic)))
    );
    assert_eq!(
        report.score("ward"),
        Some(&Err(ColumnFailure::NonNumeric(Side::Real)))
    );
    assert_eq!(report.aggregate(), Some(0.0));
}

#[test]
fn missing_cells_are_dropped_before_comparison() {
    let real = Dataset::new(vec![Column::numeric(
        "x",
        vec![Some(1.0), None, Some(2.0), Some(3.0)],
    )])
    .expect("real");
    let synthetic = Dataset::new(vec![Column::numeric(
        "x",
        vec![None, Some(1.0), Some(2.0), Some(3.0), None],
    )])
    .expect("synthetic");

    let report = evaluate_quality(&real, &synthetic, &BTreeSet::new());
    assert_eq!(report.score("x"), Some(&Ok(0.0)));
}

#[test]
fn categorical_synthetic_column_is_unavailable() {
    let real = Dataset::new(vec![Column::numbers("x", &[1.0, 2.0])]).expect("real");
    let synthetic = Dataset::new(vec![Column::labels("x", &["1", "two"])]).expect("synthetic");

    let report = evaluate_quality(&real, &synthetic, &BTreeSet::new());
    assert_eq!(
        report.score("x"),
        Some(&Err(ColumnFailure::NonNumeric(Side::Synthetic)))
    );
    assert_eq!(report.aggregate(), None);
}

#[test]
fn scores_stay_within_unit_interval() {
    let real = Dataset::new(vec![
        Column::numbers("a", &[1.0, 5.0, 9.0, 2.0, 7.5]),
        Column::numeric("b", vec![Some(-3.0), Some(0.0), Some(3.0), None, None]),
    ])
    .expect("real");
    let synthetic = Dataset::new(vec![
        Column::numeric("a", vec![Some(4.0), Some(4.5), Some(10.0), None, None, None]),
        Column::numbers("b", &[-10.0, 2.0, 2.5, 8.0, 11.0, 0.1]),
    ])
    .expect("synthetic");

    let report = evaluate_quality(&real, &synthetic, &BTreeSet::new());
    assert_eq!(report.available_count(), 2);
    for entry in report.columns() {
        let score = entry.score.expect("available");
        assert!((0.0..=1.0).contains(&score), "{} out of range", entry.column);
    }
    let aggregate = report.aggregate().expect("aggregate");
    assert!((0.0..=1.0).contains(&aggregate));
}

#[test]
fn dyadic_tie_rounds_to_even() {
    let real: Vec<f64> = (0..32).map(f64::from).collect();
    let mut synthetic: Vec<f64> = (0..31).map(f64::from).collect();
    synthetic.push(100.0);
    let real = Dataset::new(vec![Column::numbers("x", &real)]).expect("real");
    let synthetic = Dataset::new(vec![Column::numbers("x", &synthetic)]).expect("synthetic");

    let report = evaluate_quality(&real, &synthetic, &BTreeSet::new());
    assert_eq!(report.score("x"), Some(&Ok(0.0312)));
    assert_eq!(report.aggregate(), Some(0.0312));
}

#[test]
fn non_finite_cells_are_reported_per_side() {
    let real = Dataset::new(vec![
        Column::numbers("x", &[1.0, f64::NAN, 2.0]),
        Column::numbers("y", &[1.0, 2.0, 3.0]),
        Column::numbers("z", &[1.0, 2.0, 3.0]),
    ])
    .expect("real");
    let synthetic = Dataset::new(vec![
        Column::numbers("x", &[1.0, 2.0, 3.0]),
        Column::numbers("y", &[1.0, f64::INFINITY, 3.0]),
        Column::numbers("z", &[1.0, 2.0, 3.0]),
    ])
    .expect("synthetic");

    let report = evaluate_quality(&real, &synthetic, &BTreeSet::new());
    assert_eq!(
        report.score("x"),
        Some(&Err(ColumnFailure::NonFinite(Side::Real)))
    );
    assert_eq!(
        report.score("y"),
        Some(&Err(ColumnFailure::NonFinite(Side::Synthetic)))
    );
    assert_eq!(report.score("z"), Some(&Ok(0.0)));
    assert_eq!(report.aggregate(), Some(0.0));
}

#[test]
fn categorical_real_column_absent_from_synthetic_is_non_numeric() {
    let real = patients(&[65.0, 70.0], &["M", "F"]);
    let synthetic = Dataset::new(vec![Column::numbers("age", &[65.0, 70.0])]).expect("synthetic");

    let report = evaluate_quality(&real, &synthetic, &BTreeSet::new());
    assert_eq!(
        report.score("sex"),
        Some(&Err(ColumnFailure::NonNumeric(Side::Real)))
    );
}

#[test]
fn evaluation_is_idempotent() {
    let real = patients(&[65.0, 70.0, 80.0, 75.0], &["M", "F", "M", "F"]);
    let synthetic = patients(&[61.0, 90.0, 81.0, 74.0], &["F", "M", "F", "M"]);
    let columns = discrete(&["sex"]);

    let first = evaluate_quality(&real, &synthetic, &columns);
    let second = evaluate_quality(&real, &synthetic, &columns);
    assert_eq!(first, second);
}

#[test]
fn writes_metrics_and_markdown_report() {
    let real = patients(&[65.0, 70.0, 80.0, 75.0], &["M", "F", "M", "F"]);
    let synthetic = Dataset::new(vec![Column::numbers("age", &[10.0, 12.0, 11.0, 13.0])])
        .expect("synthetic");
    let report = evaluate_quality(&real, &synthetic, &BTreeSet::new());
    let metrics = QualityMetrics::new(&report, &real, &synthetic);

    let out_dir = temp_out_dir("artifacts");
    let artifacts =
        write_quality_artifacts(&metrics, &out_dir, &ReportOptions::default()).expect("write");

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(&artifacts.metrics_path).expect("read quality.json"),
    )
    .expect("parse quality.json");
    assert_eq!(json["quality_version"], "0.1");
    assert_eq!(json["global_score"], 1.0);
    assert_eq!(json["columns_unavailable"], 1);
    assert_eq!(json["columns"][1]["column"], "sex");
    assert_eq!(json["columns"][1]["failure"]["reason"], "non_numeric");
    assert_eq!(json["columns"][1]["failure"]["side"], "real");

    let markdown = fs::read_to_string(&artifacts.report_path).expect("read quality.md");
    assert_eq!(markdown, artifacts.report);
    assert!(markdown.contains("- global_score: 1.0000"));
    assert!(markdown.contains("| sex | unavailable |"));
    assert!(markdown.contains("## Most divergent columns"));
    assert!(markdown.contains("- age: 1.0000"));
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("trbx_eval_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}
