use std::fs;

use tempfile::Builder;

use sardonic::analysis::normalizer::{TextNormalizer, normalize};
use sardonic::config::PipelineConfig;
use sardonic::dataset::{DatasetSplitter, JsonlCorpusReader, Record};
use sardonic::error::SardonicError;
use sardonic::ml::ModelBundle;
use sardonic::pipeline;

const SARCASTIC: &[&str] = &[
    "area man thrilled to spend weekend answering work emails",
    "nation's dads announce they'll just wait in the car",
    "local woman can't believe she's still on hold",
    "report: everyone secretly relieved plans got cancelled",
    "man who loves traffic finally gets his wish",
    "congress celebrates record week of doing absolutely nothing",
];

const SERIOUS: &[&str] = &[
    "senate passes infrastructure bill after months of debate",
    "scientists publish findings on coral reef recovery",
    "city council approves funding for new library branch",
    "central bank holds interest rates steady",
    "storm expected to bring heavy rain to coastal areas",
    "university announces expansion of research program",
];

/// Write a JSON-lines corpus with `per_label` records for each label.
fn write_corpus(config: &PipelineConfig, per_label: usize) {
    let mut lines = Vec::new();
    for i in 0..per_label {
        let sarcastic = format!("{} <b>{}</b>", SARCASTIC[i % SARCASTIC.len()], i);
        let serious = format!("{} {}", SERIOUS[i % SERIOUS.len()], i);
        lines.push(
            serde_json::json!({
                "article_link": format!("https://news.example/s/{i}"),
                "headline": sarcastic,
                "is_sarcastic": 1,
            })
            .to_string(),
        );
        lines.push(
            serde_json::json!({
                "article_link": format!("https://news.example/n/{i}"),
                "headline": serious,
                "is_sarcastic": 0,
            })
            .to_string(),
        );
    }
    fs::write(&config.corpus_path, lines.join("\n")).unwrap();
}

fn config_in(dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig {
        corpus_path: dir.join("headlines.jsonl"),
        processed_dir: dir.join("processed"),
        model_dir: dir.join("models"),
        ..PipelineConfig::default()
    }
}

#[test]
fn test_split_scenario_100_records() {
    let records: Vec<Record> = (0..100)
        .map(|i| Record::new(format!("headline number {i}"), i % 10 < 3).with_id(format!("r{i}")))
        .collect();

    let splitter = DatasetSplitter::new(0.3, 42).unwrap();
    let first = splitter.split(records.clone()).unwrap();
    let second = splitter.split(records).unwrap();

    let ids = |split: &sardonic::dataset::Split| {
        let mut ids: Vec<String> = split.test.iter().filter_map(|r| r.id.clone()).collect();
        ids.sort();
        ids
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first.test_counts().positive, 9);
    assert_eq!(first.test.len(), 30);
}

#[test]
fn test_prepare_is_reproducible() {
    let dir = Builder::new().prefix("sardonic_prepare").tempdir().unwrap();
    let config = config_in(dir.path());
    write_corpus(&config, 30);

    pipeline::prepare(&config).unwrap();
    let first = fs::read_to_string(config.artifacts().x_test).unwrap();

    pipeline::prepare(&config).unwrap();
    let second = fs::read_to_string(config.artifacts().x_test).unwrap();

    assert_eq!(first, second);
    assert!(first.starts_with("headline\n"));
    assert!(!first.contains("https://"));
}

#[test]
fn test_full_pipeline() {
    let dir = Builder::new().prefix("sardonic_run").tempdir().unwrap();
    let config = config_in(dir.path());
    write_corpus(&config, 30);

    let summary = pipeline::run(&config).unwrap();
    assert_eq!(summary.prepare.records, 60);
    assert_eq!(summary.prepare.test.total(), 18);
    assert_eq!(summary.evaluation.samples, 18);
    assert!(summary.evaluation.report.accuracy >= 0.9);

    let cm = summary.evaluation.report.confusion_matrix;
    assert_eq!(cm.total(), 18);
    assert_eq!(
        summary.evaluation.report.class(true).support,
        summary.prepare.test.positive
    );
}

#[test]
fn test_bundle_coupling_after_reload() {
    let dir = Builder::new().prefix("sardonic_bundle").tempdir().unwrap();
    let config = config_in(dir.path());
    write_corpus(&config, 24);
    pipeline::prepare(&config).unwrap();

    let train = config.artifacts().read_train(&config.schema).unwrap();
    let texts = TextNormalizer::default()
        .normalize_all(&train.iter().map(|r| r.text.clone()).collect::<Vec<_>>());
    let labels: Vec<bool> = train.iter().map(|r| r.label).collect();

    let bundle = ModelBundle::train(&texts, &labels, &config.classifier).unwrap();
    let probe = vec![
        normalize("area man finally relieved"),
        normalize("council approves research funding"),
        normalize("completely unseen words here"),
        normalize(""),
    ];
    let before = bundle.predict_proba(&probe).unwrap();

    bundle.save(config.bundle_path()).unwrap();
    let loaded = ModelBundle::load(config.bundle_path()).unwrap();

    assert_eq!(loaded.predict_proba(&probe).unwrap(), before);
    assert_eq!(loaded.vocabulary(), bundle.vocabulary());
}

#[test]
fn test_evaluate_requires_trained_model() {
    let dir = Builder::new().prefix("sardonic_eval").tempdir().unwrap();
    let config = config_in(dir.path());
    write_corpus(&config, 10);
    pipeline::prepare(&config).unwrap();

    assert!(matches!(
        pipeline::evaluate(&config),
        Err(SardonicError::ModelNotFound(_))
    ));
    assert!(matches!(
        pipeline::predict(&config, &["anything"]),
        Err(SardonicError::ModelNotFound(_))
    ));
}

#[test]
fn test_prepare_errors() {
    let dir = Builder::new().prefix("sardonic_errors").tempdir().unwrap();
    let config = config_in(dir.path());

    // Missing corpus file.
    assert!(matches!(
        pipeline::prepare(&config),
        Err(SardonicError::Io(_))
    ));

    // Only empty texts.
    fs::write(
        &config.corpus_path,
        "{\"headline\": \"\", \"is_sarcastic\": 1}\n{\"headline\": \" \", \"is_sarcastic\": 0}\n",
    )
    .unwrap();
    assert!(matches!(
        pipeline::prepare(&config),
        Err(SardonicError::EmptyCorpus(_))
    ));

    // A single sarcastic record cannot be split.
    fs::write(
        &config.corpus_path,
        "{\"headline\": \"a\", \"is_sarcastic\": 1}\n{\"headline\": \"b\", \"is_sarcastic\": 0}\n{\"headline\": \"c\", \"is_sarcastic\": 0}\n",
    )
    .unwrap();
    assert!(matches!(
        pipeline::prepare(&config),
        Err(SardonicError::InvalidSplit(_))
    ));
}

#[test]
fn test_reader_drops_empty_texts() {
    let input = "{\"headline\": \"kept\", \"is_sarcastic\": 0}\n{\"headline\": \"\", \"is_sarcastic\": 1}\n";
    let records = JsonlCorpusReader::default()
        .read(std::io::Cursor::new(input))
        .unwrap();
    assert_eq!(records.len(), 1);
}
