//! Transcoder dispatcher integration tests: artifact fan-in, per-item
//! failure isolation, and store retry behavior.

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tdmsflow::config::RunLayout;
use tdmsflow::decode::SegmentDecoder;
use tdmsflow::store::{ErrorKind, FakeStore, RemoteStore, RetryConfig};
use tdmsflow::testing::{temp_layout, write_segment_file};
use tdmsflow::transcode::{Stage, enumerate_work, table_name, transcode_run};

/// One single-channel capture per parent directory; parent `i` gets
/// `i + 1` samples so row counts are distinguishable.
fn seed_run(layout: &RunLayout, run: u32, parents: &[&str]) -> Result<()> {
    for (i, parent) in parents.iter().enumerate() {
        let samples: Vec<f64> = (0..=i).map(|s| s as f64).collect();
        let channels = [("fz", samples.as_slice())];
        write_segment_file(&layout.input_root(run).join(parent).join("capture.tdms"), &channels)?;
    }
    Ok(())
}

#[test]
fn four_files_produce_four_artifacts() -> Result<()> {
    let (_dir, layout) = temp_layout()?;
    let parents =
        ["forceplate_000000", "forceplate_000001", "treadmill_000000", "treadmill_000001"];
    seed_run(&layout, 10, &parents)?;

    let store = FakeStore::new();
    let summary = transcode_run(
        &layout,
        10,
        2,
        Arc::new(SegmentDecoder),
        Arc::new(store.clone()),
        RetryConfig::immediate(),
    )?;

    assert_eq!(summary.items, 4);
    assert_eq!(summary.uploaded, 4);
    assert!(summary.is_clean());
    assert_eq!(summary.rows, 1 + 2 + 3 + 4);
    assert!(summary.wall_secs >= 0.0);

    assert!(store.exists("/generated/output10")?);
    assert_eq!(
        store.list("/generated/output10")?,
        vec![
            "forceplate_000000.csv",
            "forceplate_000001.csv",
            "treadmill_000000.csv",
            "treadmill_000001.csv",
        ]
    );
    Ok(())
}

#[test]
fn artifact_rows_match_fixture_record_count() -> Result<()> {
    let (_dir, layout) = temp_layout()?;
    let channels = [("fz", [1.0, 2.0, 3.0, 4.0, 5.0].as_slice()), ("fx", [0.5, 0.25].as_slice())];
    write_segment_file(
        &layout.input_root(7).join("forceplate_000000").join("capture.tdms"),
        &channels,
    )?;

    let store = FakeStore::new();
    let summary = transcode_run(
        &layout,
        7,
        1,
        Arc::new(SegmentDecoder),
        Arc::new(store.clone()),
        RetryConfig::immediate(),
    )?;
    assert_eq!(summary.rows, 5);

    let csv_bytes = store.get("/generated/output7/forceplate_000000.csv")?;
    let mut reader = csv::Reader::from_reader(csv_bytes.as_slice());
    assert_eq!(reader.headers()?.iter().collect::<Vec<_>>(), vec!["fz", "fx"]);
    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
    assert_eq!(records.len(), 5);
    Ok(())
}

#[test]
fn decode_failure_is_isolated_to_its_item() -> Result<()> {
    let (_dir, layout) = temp_layout()?;
    seed_run(&layout, 4, &["good_000000", "good_000001"])?;
    let broken_dir = layout.input_root(4).join("broken_000000");
    fs::create_dir_all(&broken_dir)?;
    fs::write(broken_dir.join("capture.tdms"), b"not a segment")?;

    let store = FakeStore::new();
    let summary = transcode_run(
        &layout,
        4,
        2,
        Arc::new(SegmentDecoder),
        Arc::new(store.clone()),
        RetryConfig::immediate(),
    )?;

    assert_eq!(summary.items, 3);
    assert_eq!(summary.uploaded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].stage, Stage::Decode);
    assert_eq!(summary.failures[0].table, "broken_000000.csv");
    assert_eq!(store.object_count(), 2);
    Ok(())
}

#[test]
fn transient_upload_failures_are_retried() -> Result<()> {
    let (_dir, layout) = temp_layout()?;
    seed_run(&layout, 5, &["forceplate_000000"])?;

    let store = FakeStore::new();
    store.fail_puts(ErrorKind::Network, 2);
    let summary = transcode_run(
        &layout,
        5,
        1,
        Arc::new(SegmentDecoder),
        Arc::new(store.clone()),
        RetryConfig::immediate(),
    )?;

    assert_eq!(summary.uploaded, 1);
    assert!(summary.is_clean());
    assert_eq!(store.object_count(), 1);
    Ok(())
}

#[test]
fn exhausted_retries_fail_the_item_not_the_run() -> Result<()> {
    let (_dir, layout) = temp_layout()?;
    seed_run(&layout, 5, &["forceplate_000000", "forceplate_000001"])?;

    let store = FakeStore::new();
    // More failures than attempts; the first upload never lands.
    store.fail_puts(ErrorKind::Network, 3);
    let summary = transcode_run(
        &layout,
        5,
        1,
        Arc::new(SegmentDecoder),
        Arc::new(store.clone()),
        RetryConfig::immediate(),
    )?;

    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].stage, Stage::Upload);
    Ok(())
}

#[test]
fn authentication_failure_fails_the_run() -> Result<()> {
    let (_dir, layout) = temp_layout()?;
    seed_run(&layout, 6, &["forceplate_000000"])?;

    let store = FakeStore::new();
    store.fail_puts(ErrorKind::Authentication, 1);
    let result = transcode_run(
        &layout,
        6,
        1,
        Arc::new(SegmentDecoder),
        Arc::new(store),
        RetryConfig::immediate(),
    );

    let err = result.expect_err("authentication failure must fail the run");
    assert!(err.to_string().contains("store rejected the run"));
    Ok(())
}

#[test]
fn store_mkdirs_failure_aborts_before_dispatch() -> Result<()> {
    let (_dir, layout) = temp_layout()?;
    seed_run(&layout, 6, &["forceplate_000000"])?;

    let store = FakeStore::new();
    store.fail_next(ErrorKind::Authentication, 1);
    let result = transcode_run(
        &layout,
        6,
        1,
        Arc::new(SegmentDecoder),
        Arc::new(store.clone()),
        RetryConfig::immediate(),
    );

    assert!(format!("{:#}", result.expect_err("mkdirs failure")).contains("create remote directory"));
    assert_eq!(store.object_count(), 0);
    Ok(())
}

#[test]
fn rerun_overwrites_artifacts() -> Result<()> {
    let (_dir, layout) = temp_layout()?;
    seed_run(&layout, 9, &["forceplate_000000", "forceplate_000001"])?;

    let store = FakeStore::new();
    for _ in 0..2 {
        let summary = transcode_run(
            &layout,
            9,
            2,
            Arc::new(SegmentDecoder),
            Arc::new(store.clone()),
            RetryConfig::immediate(),
        )?;
        assert!(summary.is_clean());
    }
    assert_eq!(store.object_count(), 2);
    Ok(())
}

#[test]
fn zero_workers_selects_the_cpu_count() -> Result<()> {
    let (_dir, layout) = temp_layout()?;
    seed_run(&layout, 2, &["forceplate_000000"])?;

    let store = FakeStore::new();
    let summary = transcode_run(
        &layout,
        2,
        0,
        Arc::new(SegmentDecoder),
        Arc::new(store),
        RetryConfig::immediate(),
    )?;
    assert!(summary.workers >= 1);
    assert_eq!(summary.uploaded, 1);
    Ok(())
}

#[test]
fn table_name_uses_the_parent_directory() {
    let path = Path::new("generated/input10/forceplate_000003/capture.tdms");
    assert_eq!(table_name(path).as_deref(), Some("forceplate_000003.csv"));
    assert_eq!(table_name(Path::new("capture.tdms")), None);
}

#[test]
fn enumeration_is_recursive_sorted_and_filtered() -> Result<()> {
    let (_dir, layout) = temp_layout()?;
    let input_root = layout.input_root(3);
    write_segment_file(&input_root.join("b_000000/capture.tdms"), &[("fz", [1.0].as_slice())])?;
    write_segment_file(&input_root.join("a_000000/deep/capture.tdms"), &[("fz", [1.0].as_slice())])?;
    fs::write(input_root.join("b_000000/notes.txt"), b"ignored")?;

    let items = enumerate_work(&layout, 3)?;
    assert_eq!(items.len(), 2);
    assert!(items[0].path.ends_with("a_000000/deep/capture.tdms"));
    assert_eq!(items[0].table, "deep.csv");
    assert_eq!(items[1].table, "b_000000.csv");
    assert_eq!(items[0].run, 3);
    Ok(())
}
