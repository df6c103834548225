// Integration tests for sensorknn
use sensorknn::prelude::*;
use sensorknn::{knn_estimate, load_dataset, Error, ReaderSource, StreamError};
use std::io::{Cursor, Write};

fn uniform(value: f64) -> FeatureVector {
    FeatureVector::new(vec![value; 6])
}

fn two_point_dataset() -> ReferenceDataset {
    let mut dataset = ReferenceDataset::with_dimension(6);
    dataset.insert(uniform(0.0), 10.0).unwrap();
    dataset.insert(uniform(10.0), 20.0).unwrap();
    dataset
}

#[test]
fn test_end_to_end_scenario() {
    let estimate = knn_estimate(&two_point_dataset(), &uniform(1.0), 2).unwrap();
    assert!((estimate - 10.0).abs() < (estimate - 20.0).abs());
}

#[test]
fn test_parser_emits_one_vector_for_two_lines() {
    let parser = VectorParser::default();
    let vectors: Vec<FeatureVector> = ["1,2,3,4,5,6,7\r\n", "1,2\r\n"]
        .iter()
        .filter_map(|line| parser.parse_line(line))
        .collect();

    assert_eq!(vectors.len(), 1);
    assert_eq!(vectors[0].as_slice(), &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
}

#[test]
fn test_empty_dataset_never_yields_a_number() {
    let dataset = ReferenceDataset::with_dimension(6);
    for k in [1, 5, 100] {
        assert!(matches!(
            knn_estimate(&dataset, &uniform(3.0), k),
            Err(Error::EmptyDataset)
        ));
    }
}

#[test]
fn test_k_up_to_and_beyond_dataset_size() {
    let mut dataset = ReferenceDataset::with_dimension(6);
    for i in 0..8 {
        dataset.insert(uniform(i as f64 * 3.0), i as f64).unwrap();
    }

    for k in 1..=12 {
        let estimator = KnnEstimator::new(dataset.clone(), EstimatorConfig::with_k(k)).unwrap();
        let estimate = estimator.estimate(&uniform(4.0)).unwrap();
        assert_eq!(estimate.neighbors, k.min(8));
        assert!(estimate.value >= 0.0 && estimate.value <= 7.0);
    }
}

#[test]
fn test_stream_from_json_reference_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    let items = vec![
        ReferenceItem::new(uniform(0.0), 10.0).with_label("near"),
        ReferenceItem::new(uniform(10.0), 20.0).with_label("far"),
    ];
    file.write_all(serde_json::to_string(&items).unwrap().as_bytes())
        .unwrap();

    let dataset = load_dataset(file.path(), 6).unwrap();
    let estimator = KnnEstimator::new(dataset, EstimatorConfig::with_k(2)).unwrap();
    let mut pipeline = Pipeline::new(VectorParser::default(), estimator).unwrap();

    let input = "hello\r\nAGS,1,1,1,1,1,1\r\n1,2\r\nAGS,10,10,10,10,10,10\r\n";
    let source = ReaderSource::new(Cursor::new(input));
    let mut sink = WriterSink::new(Vec::new(), 3);

    let stats = pipeline.run(Lines::new(source), &mut sink).unwrap();
    assert_eq!(stats.lines, 4);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.estimates, 2);

    let output = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(output, "11.000\n20.000\n");
}

#[test]
fn test_stream_from_csv_reference_file() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "direction,x1,x2,x3,x4,x5,x6,heading").unwrap();
    writeln!(file, "north,0,0,0,0,0,0,0").unwrap();
    writeln!(file, "east,100,0,0,0,0,0,90").unwrap();
    writeln!(file, "south,100,100,0,0,0,0,180").unwrap();
    file.flush().unwrap();

    let dataset = load_dataset(file.path(), 6).unwrap();
    assert_eq!(dataset.len(), 3);

    let config = EstimatorConfig {
        k: 1,
        metric: Metric::Manhattan,
        weighting: Weighting::Uniform,
    };
    let estimator = KnnEstimator::new(dataset, config).unwrap();
    let neighbors = estimator
        .neighbors(&FeatureVector::from_readings(&[95, 5, 0, 0, 0, 0]))
        .unwrap();

    let nearest = estimator.dataset().get(neighbors[0].index).unwrap();
    assert_eq!(nearest.label.as_deref(), Some("east"));
    assert_eq!(neighbors[0].outcome, 90.0);
}

#[test]
fn test_missing_reference_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_dataset(&dir.path().join("missing.json"), 6).unwrap_err();
    assert!(matches!(err, StreamError::Io(_)));
}
