//! End-to-end pipeline tests on a realistic mixed dataset

use eda_engine::prelude::*;

/// 1000 rows, 10 columns: an id, two columns with 15% missing cells, a
/// perfectly correlated numeric pair, plain numeric features, a date
/// column and a 4:1 imbalanced categorical target.
fn customer_dataset() -> Dataset {
    let n = 1000;

    let base: Vec<f64> = (0..n).map(|i| ((i * 17) % 250) as f64 * 0.4).collect();
    let scaled: Vec<f64> = base.iter().map(|v| 3.0 * v + 10.0).collect();

    let missing_a: Vec<Option<f64>> = (0..n)
        .map(|i| {
            if i % 20 < 3 {
                None
            } else {
                Some(((i * 7) % 90) as f64)
            }
        })
        .collect();
    let missing_b: Vec<Option<f64>> = (0..n)
        .map(|i| {
            if (i + 5) % 20 < 3 {
                None
            } else {
                Some(((i * 11) % 60) as f64 + 0.5)
            }
        })
        .collect();

    let dates: Vec<String> = (0..n)
        .map(|i| format!("2024-{:02}-{:02}", (i % 12) + 1, (i % 28) + 1))
        .collect();

    Dataset::new(vec![
        DataColumn::ints("customer_id", (1..=n as i64).collect()),
        DataColumn::numeric("spend", base.iter().copied().map(Some).collect()),
        DataColumn::numeric("spend_scaled", scaled.iter().copied().map(Some).collect()),
        DataColumn::numeric("visits", missing_a),
        DataColumn::numeric("minutes", missing_b),
        DataColumn::numeric(
            "age",
            (0..n).map(|i| Some(18.0 + ((i * 13) % 60) as f64)).collect(),
        ),
        DataColumn::numeric(
            "balance",
            (0..n).map(|i| Some(((i * 29) % 500) as f64 - 250.0)).collect(),
        ),
        DataColumn::text(
            "signup_date",
            dates.iter().map(|s| s.as_str()).collect(),
        ),
        DataColumn::text(
            "region",
            (0..n)
                .map(|i| match i % 4 {
                    0 => "north",
                    1 => "south",
                    2 => "east",
                    _ => "west",
                })
                .collect(),
        ),
        DataColumn::text(
            "churned",
            (0..n).map(|i| if i % 5 == 0 { "yes" } else { "no" }).collect(),
        ),
    ])
    .unwrap()
}

#[test]
fn test_end_to_end_report() {
    let ds = customer_dataset();
    let report = EdaAnalyzer::new(AnalysisConfig::default())
        .analyze(&ds, Some("churned"))
        .unwrap();

    assert_eq!(report.summary.n_rows, 1000);
    assert_eq!(report.summary.n_cols, 10);

    // Missing cells in two columns keep the DRI below perfect
    assert!(report.summary.dri < 100.0);
    assert!(report.quality.components.missingness < 100.0);

    // The id column is recognized and promoted to key candidate
    let id_profile = report.structure.profile("customer_id").unwrap();
    assert_eq!(id_profile.semantic_type, SemanticType::Identifier);
    assert!(report
        .structure
        .primary_key_candidates
        .contains(&"customer_id".to_string()));

    // The date column is typed with a concrete format
    let date_profile = report.structure.profile("signup_date").unwrap();
    assert_eq!(date_profile.semantic_type, SemanticType::DateTime);
    assert!(date_profile.date_format.is_some());
}

#[test]
fn test_perfect_pair_is_strong_and_redundant() {
    let ds = customer_dataset();
    let report = EdaAnalyzer::new(AnalysisConfig::default())
        .analyze(&ds, Some("churned"))
        .unwrap();

    let entries = report.correlation.pair("spend", "spend_scaled");
    assert!(!entries.is_empty());
    for entry in entries {
        assert!(entry.value > 0.999);
        assert_eq!(entry.strength, Strength::Strong);
    }

    assert!(report
        .correlation
        .redundant_pairs
        .iter()
        .any(|p| p.column_a == "spend" && p.column_b == "spend_scaled"));
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("highly correlated")));
}

#[test]
fn test_four_to_one_target_is_moderate() {
    let ds = customer_dataset();
    let report = EdaAnalyzer::new(AnalysisConfig::default())
        .analyze(&ds, Some("churned"))
        .unwrap();

    let imbalance = report.readiness.target.unwrap().imbalance.unwrap();
    assert_eq!(imbalance.ratio, 4.0);
    assert_eq!(imbalance.severity, ImbalanceSeverity::Moderate);
    assert!(imbalance.recommend_oversampling);
    assert_eq!(imbalance.majority_class, "no");
    assert_eq!(imbalance.minority_class, "yes");
}

#[test]
fn test_repeat_runs_are_byte_identical() {
    let ds = customer_dataset();
    let analyzer = EdaAnalyzer::new(AnalysisConfig::default());

    let first = analyzer.analyze(&ds, Some("churned")).unwrap();
    let second = analyzer.analyze(&ds, Some("churned")).unwrap();

    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_report_store_round_trip() {
    let ds = customer_dataset();
    let report = EdaAnalyzer::new(AnalysisConfig::default())
        .analyze(&ds, Some("churned"))
        .unwrap();

    let store = ReportStore::new();
    let key = ds.fingerprint();
    store.insert(key.clone(), report);

    let fetched = store.get(&key).unwrap();
    assert_eq!(fetched.summary.n_rows, 1000);
    assert_eq!(store.fingerprints(), vec![key]);
}

#[test]
fn test_row_sampling_kicks_in_above_cap() {
    let ds = customer_dataset();
    let config = AnalysisConfig::default().with_max_rows_exact(200);
    let report = EdaAnalyzer::new(config.clone())
        .analyze(&ds, Some("churned"))
        .unwrap();

    assert!(report.quality.sampled_rows.unwrap() <= 200);
    assert!(report.correlation.sampled_rows.unwrap() <= 200);

    // Sampling is deterministic, so the report still reproduces
    let report2 = EdaAnalyzer::new(config).analyze(&ds, Some("churned")).unwrap();
    assert_eq!(report.to_json().unwrap(), report2.to_json().unwrap());
}

#[test]
fn test_loader_csv_feeds_pipeline() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.csv");
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "amount,segment").unwrap();
        for i in 0..120 {
            writeln!(
                file,
                "{},{}",
                (i % 13) as f64 * 2.5,
                if i % 2 == 0 { "a" } else { "b" }
            )
            .unwrap();
        }
    }

    let ds = DatasetLoader::new()
        .load_csv(path.to_str().unwrap())
        .unwrap();
    assert_eq!(ds.n_rows(), 120);
    assert_eq!(ds.n_cols(), 2);

    let report = EdaAnalyzer::new(AnalysisConfig::default())
        .analyze(&ds, Some("segment"))
        .unwrap();
    assert!(report.summary.dri > 0.0);
}
