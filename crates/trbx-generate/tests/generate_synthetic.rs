use std::collections::BTreeSet;

use trbx_core::{Column, Dataset};
use trbx_generate::{
    generate_synthetic, DiscreteColumns, GenerateOptions, GenerationEngine, GenerationError,
    MarginalSynthesizer, Synthesizer, SynthesizerConfig,
};

fn mini_patients() -> Dataset {
    Dataset::new(vec![
        Column::labels("sex", &["M", "F", "M", "F"]),
        Column::numbers("age", &[65.0, 70.0, 80.0, 75.0]),
        Column::labels("label", &["A", "B", "A", "B"]),
    ])
    .expect("patients")
}

fn cohort() -> Dataset {
    let ages: Vec<f64> = (0..200).map(|i| 40.0 + (i % 45) as f64).collect();
    let bmi: Vec<Option<f64>> = (0..200)
        .map(|i| {
            if i % 10 == 0 {
                None
            } else {
                Some(18.5 + (i % 17) as f64 * 0.75)
            }
        })
        .collect();
    let wards: Vec<&str> = (0..200)
        .map(|i| if i % 4 == 0 { "icu" } else { "general" })
        .collect();
    Dataset::new(vec![
        Column::numbers("age", &ages),
        Column::numeric("bmi", bmi),
        Column::labels("ward", &wards),
    ])
    .expect("cohort")
}

#[test]
fn generates_requested_number_of_rows() {
    let options = GenerateOptions {
        n_samples: 2,
        ..GenerateOptions::default()
    };
    let output = generate_synthetic(&mini_patients(), &options).expect("generate");

    assert_eq!(output.synthetic.row_count(), 2);
    assert_eq!(output.synthetic.column_names(), vec!["sex", "age", "label"]);
    assert!(output.model.is_none());
    assert!(output.quality.is_some());
}

#[test]
fn drops_target_column_and_infers_discrete_columns() {
    let options = GenerateOptions {
        target_column: Some("label".to_string()),
        n_samples: 10,
        ..GenerateOptions::default()
    };
    let output = generate_synthetic(&mini_patients(), &options).expect("generate");

    assert!(!output.synthetic.has_column("label"));
    assert_eq!(
        output.discrete_columns,
        BTreeSet::from(["sex".to_string()])
    );

    let quality = output.quality.expect("quality report");
    assert!(quality.contains("age"));
    assert!(!quality.contains("sex"));
    assert!(!quality.contains("label"));
    let age = quality.score("age").expect("age").expect("age available");
    assert!((0.0..=1.0).contains(&age));
    assert_eq!(quality.aggregate(), Some(age));
}

#[test]
fn missing_target_column_is_ignored() {
    let options = GenerateOptions {
        target_column: Some("outcome".to_string()),
        n_samples: 3,
        ..GenerateOptions::default()
    };
    let output = generate_synthetic(&mini_patients(), &options).expect("generate");
    assert_eq!(output.synthetic.column_count(), 3);
}

#[test]
fn flags_control_model_and_quality() {
    let options = GenerateOptions {
        n_samples: 5,
        return_model: true,
        evaluate_quality: false,
        ..GenerateOptions::default()
    };
    let output = generate_synthetic(&mini_patients(), &options).expect("generate");

    assert!(output.quality.is_none());
    let model = output.model.expect("model returned");
    assert!(model.is_fitted());
    assert_eq!(model.column_names(), vec!["sex", "age", "label"]);
}

#[test]
fn generation_is_deterministic_for_a_seed() {
    let options = GenerateOptions {
        n_samples: 50,
        ..GenerateOptions::default()
    };
    let first = generate_synthetic(&cohort(), &options).expect("first");
    let second = generate_synthetic(&cohort(), &options).expect("second");
    assert_eq!(first.synthetic, second.synthetic);

    let reseeded = GenerateOptions {
        synthesizer: SynthesizerConfig {
            seed: 7,
            ..SynthesizerConfig::default()
        },
        ..options
    };
    let third = generate_synthetic(&cohort(), &reseeded).expect("third");
    assert_ne!(first.synthetic, third.synthetic);
}

#[test]
fn sampled_values_follow_observed_support() {
    let options = GenerateOptions {
        n_samples: 500,
        ..GenerateOptions::default()
    };
    let output = generate_synthetic(&cohort(), &options).expect("generate");

    let ages = output
        .synthetic
        .column("age")
        .and_then(|column| column.numeric_values())
        .expect("ages");
    assert_eq!(ages.len(), 500);
    assert!(ages.iter().all(|age| (40.0..=84.0).contains(age)));
    assert!(ages.iter().all(|age| age.fract() == 0.0));

    let wards = output.synthetic.column("ward").expect("ward");
    assert!(!wards.is_numeric());

    let quality = output.quality.expect("quality");
    let age_score = quality.score("age").expect("age").expect("available");
    assert!(age_score < 0.2, "age distance too large: {age_score}");
    assert!(quality.score("bmi").expect("bmi").is_ok());
}

#[test]
fn explicit_discrete_columns_are_used_verbatim() {
    let options = GenerateOptions {
        n_samples: 20,
        discrete_columns: DiscreteColumns::explicit(["sex", "age"]),
        ..GenerateOptions::default()
    };
    let output = generate_synthetic(&mini_patients(), &options).expect("generate");

    let quality = output.quality.expect("quality");
    assert!(!quality.contains("age"));
    assert_eq!(
        quality.score("label"),
        Some(&Err(trbx_eval::ColumnFailure::NonNumeric(trbx_eval::Side::Real)))
    );
    assert_eq!(quality.aggregate(), None);

    let ages = output
        .synthetic
        .column("age")
        .and_then(|column| column.numeric_values())
        .expect("ages");
    assert!(ages.iter().all(|age| [65.0, 70.0, 75.0, 80.0].contains(age)));
}

#[test]
fn unknown_discrete_column_fails_fit() {
    let options = GenerateOptions {
        discrete_columns: DiscreteColumns::explicit(["smoker"]),
        ..GenerateOptions::default()
    };
    let err = generate_synthetic(&mini_patients(), &options).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidInput(_)));
}

#[test]
fn rejects_datasets_without_columns_or_rows() {
    let err = generate_synthetic(&Dataset::empty(), &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidInput(_)));

    let no_rows = Dataset::new(vec![Column::numbers("age", &[])]).expect("no rows");
    let err = generate_synthetic(&no_rows, &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidInput(_)));

    let only_target = Dataset::new(vec![Column::labels("label", &["A"])]).expect("only target");
    let options = GenerateOptions {
        target_column: Some("label".to_string()),
        ..GenerateOptions::default()
    };
    let err = generate_synthetic(&only_target, &options).unwrap_err();
    assert!(matches!(err, GenerationError::InvalidInput(_)));
}

#[test]
fn pretrained_model_is_reused_without_refitting() {
    let data = mini_patients();
    let discrete = data.categorical_columns();
    let mut model = MarginalSynthesizer::untrained(&SynthesizerConfig::default());
    model.fit(&data, &discrete).expect("fit");

    let engine = GenerationEngine::new(GenerateOptions {
        n_samples: 8,
        return_model: true,
        ..GenerateOptions::default()
    });
    let other = Dataset::new(vec![Column::numbers("age", &[1.0, 2.0])]).expect("other");
    let output = engine.run(&other, Some(model)).expect("run with pretrained model");

    assert_eq!(output.synthetic.column_names(), vec!["sex", "age", "label"]);
    assert_eq!(output.synthetic.row_count(), 8);
    assert!(output.model.is_some());
}

#[test]
fn unfitted_pretrained_model_is_an_error() {
    let engine = GenerationEngine::new(GenerateOptions::default());
    let model = MarginalSynthesizer::untrained(&SynthesizerConfig::default());
    let err = engine.run(&mini_patients(), Some(model)).unwrap_err();
    assert!(matches!(err, GenerationError::NotFitted));
}

#[test]
fn zero_samples_yield_empty_dataset() {
    let options = GenerateOptions {
        n_samples: 0,
        ..GenerateOptions::default()
    };
    let output = generate_synthetic(&mini_patients(), &options).expect("generate");
    assert_eq!(output.synthetic.row_count(), 0);

    let quality = output.quality.expect("quality");
    assert_eq!(
        quality.score("age"),
        Some(&Err(trbx_eval::ColumnFailure::Empty(trbx_eval::Side::Synthetic)))
    );
    assert_eq!(quality.aggregate(), None);
}
