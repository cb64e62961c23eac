use nodescope::analysis::{HighTimeFilter, HighTimeMetric};
use nodescope::domain::{NodeIndex, ReplayError};
use nodescope::run_data::RunData;
use nodescope::stats::Statistics;
use tempfile::TempDir;

const SAMPLE_RUN: &str = "tests/fixtures/sample_run";

#[test]
fn test_load_sample_run() {
    let data = RunData::load(SAMPLE_RUN).unwrap();

    assert_eq!(data.nodes.len(), 10);
    assert_eq!(data.backtracking_nodes, vec![NodeIndex(2), NodeIndex(7)]);

    // Nodes are listed in order with no gaps
    for (i, node) in data.nodes.iter().enumerate() {
        assert_eq!(node.node.0 as usize, i);
    }

    let summary = data.summary.expect("sample run has a summary");
    assert_eq!(summary.node_count, 10);
    assert_eq!(summary.high_time_metric, HighTimeMetric::Total);
    assert_eq!(summary.opcode_counts.get("COMPARE"), Some(&30));
}

#[test]
fn test_total_metric_distances() {
    let data = RunData::load(SAMPLE_RUN).unwrap();
    let (high_time, correlation) = data.analyze(&HighTimeFilter::default());

    // Node 9 sits exactly on the threshold and still counts
    let flagged: Vec<u32> = high_time.iter().map(|h| h.node.0).collect();
    assert_eq!(flagged, vec![3, 5, 9]);

    let distances: Vec<(u32, i64)> =
        correlation.distances.iter().map(|d| (d.node.0, d.distance)).collect();
    assert_eq!(distances, vec![(3, 1), (5, -2), (9, 2)]);

    // All buckets hold one node, so they are ordered by distance
    let buckets: Vec<i64> = correlation.histogram.iter().map(|b| b.distance).collect();
    assert_eq!(buckets, vec![-2, 1, 2]);
}

#[test]
fn test_matching_metric_ignores_nodes_outside_the_loop() {
    let data = RunData::load(SAMPLE_RUN).unwrap();
    let filter = HighTimeFilter::new(0.003, HighTimeMetric::Matching).unwrap();
    let (high_time, correlation) = data.analyze(&filter);

    // Node 3 spends 0.004s in theory but never entered the matching loop
    let flagged: Vec<u32> = high_time.iter().map(|h| h.node.0).collect();
    assert_eq!(flagged, vec![1, 5]);

    let distances: Vec<i64> = correlation.distances.iter().map(|d| d.distance).collect();
    assert_eq!(distances, vec![-1, -2]);
}

#[test]
fn test_statistics_from_replay() {
    let data = RunData::load(SAMPLE_RUN).unwrap();
    let mut stats = Statistics::new();
    data.collect_statistics(&HighTimeFilter::default(), &mut stats);

    assert_eq!(stats.get("max node"), Some(10.0));
    assert_eq!(stats.get("high time count"), Some(3.0));
    assert_eq!(stats.get("backtracking nodes"), Some(2.0));
    let matching = stats.get("matching time").unwrap();
    assert!((matching - 0.019).abs() < 1e-9);
}

#[test]
fn test_summary_is_optional() {
    let data = RunData::load("tests/fixtures/no_summary").unwrap();
    assert!(data.summary.is_none());
    assert!(data.backtracking_nodes.is_empty());

    // Without backtracks there is nothing to correlate against
    let (high_time, correlation) = data.analyze(&HighTimeFilter::default());
    assert_eq!(high_time.len(), 3);
    assert!(correlation.is_empty());
}

#[test]
fn test_missing_table_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = RunData::load(dir.path()).unwrap_err();
    assert!(matches!(err, ReplayError::MissingTable(path) if path.ends_with("timing.csv")));
}

#[test]
fn test_schema_version_mismatch() {
    let dir = TempDir::new().unwrap();
    for table in ["timing.csv", "backtracking_nodes.csv"] {
        std::fs::copy(format!("{SAMPLE_RUN}/{table}"), dir.path().join(table)).unwrap();
    }
    let summary = std::fs::read_to_string(format!("{SAMPLE_RUN}/general.json"))
        .unwrap()
        .replace("\"schema_version\": 3", "\"schema_version\": 1");
    std::fs::write(dir.path().join("general.json"), summary).unwrap();

    let err = RunData::load(dir.path()).unwrap_err();
    assert!(matches!(err, ReplayError::SchemaMismatch { found: 1, expected: 3 }));
}

#[test]
fn test_shuffled_timing_rows_are_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("timing.csv"),
        "node,total_time,entered_matching_loop,matching_time,matching_queue_time,theory_time\n\
         9,0.02,0,0,0,0\n\
         3,0.02,0,0,0,0\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("backtracking_nodes.csv"), "backtracking_node\n2\n7\n10\n")
        .unwrap();

    let err = RunData::load(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        ReplayError::MalformedRow { ref table, line: 2, .. } if table == "timing.csv"
    ));
}
