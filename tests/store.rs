//! Store backend tests: local directory mapping, fake failure injection,
//! retry policy, and target parsing.

use anyhow::Result;
use std::str::FromStr;
use tdmsflow::config::{StoreConfig, StoreTarget};
use tdmsflow::store::{
    DirStore, ErrorKind, FakeStore, RemoteStore, RetryConfig, StoreError, open_store,
    retry_with_backoff,
};

#[test]
fn dir_store_put_get_roundtrip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = DirStore::new(dir.path());

    store.mkdirs("/generated/output3")?;
    store.put("/generated/output3/forceplate.csv", b"fz\n1\n", true)?;
    assert!(store.exists("/generated/output3/forceplate.csv")?);
    assert_eq!(store.get("/generated/output3/forceplate.csv")?, b"fz\n1\n");
    assert_eq!(store.list("/generated/output3")?, vec!["forceplate.csv"]);

    // mkdirs tolerates existing directories.
    store.mkdirs("/generated/output3")?;
    Ok(())
}

#[test]
fn dir_store_put_honors_the_overwrite_flag() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = DirStore::new(dir.path());

    store.put("/out/run.csv", b"first", false)?;
    let err = store.put("/out/run.csv", b"second", false).expect_err("conflict");
    assert_eq!(err.kind, ErrorKind::AlreadyExists);

    store.put("/out/run.csv", b"second", true)?;
    assert_eq!(store.get("/out/run.csv")?, b"second");
    Ok(())
}

#[test]
fn dir_store_missing_object_is_not_found() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = DirStore::new(dir.path());

    let err = store.get("/nope.csv").expect_err("missing object");
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(!store.exists("/nope.csv")?);
    Ok(())
}

#[test]
fn dir_store_rejects_paths_escaping_the_root() {
    let store = DirStore::new("store-root");
    let err = store.exists("/../outside").expect_err("escape");
    assert_eq!(err.kind, ErrorKind::InvalidInput);
}

#[test]
fn fake_store_injects_failures_in_order() -> Result<()> {
    let store = FakeStore::new();
    store.fail_next(ErrorKind::Network, 1);

    let err = store.mkdirs("/x").expect_err("queued failure");
    assert_eq!(err.kind, ErrorKind::Network);
    store.mkdirs("/x")?;
    Ok(())
}

#[test]
fn fake_store_put_failures_only_hit_puts() -> Result<()> {
    let store = FakeStore::new();
    store.fail_puts(ErrorKind::ServiceUnavailable, 1);

    store.mkdirs("/out")?;
    let err = store.put("/out/a.csv", b"x", true).expect_err("queued put failure");
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    store.put("/out/a.csv", b"x", true)?;
    assert_eq!(store.object_count(), 1);
    Ok(())
}

#[test]
fn retry_recovers_from_transient_failures() {
    let mut attempts = 0;
    let result = retry_with_backoff(&RetryConfig::immediate(), || {
        attempts += 1;
        if attempts < 3 { Err(StoreError::new(ErrorKind::Network, "flaky")) } else { Ok(attempts) }
    });
    assert_eq!(result.expect("third attempt succeeds"), 3);
}

#[test]
fn retry_does_not_touch_persistent_failures() {
    let mut attempts = 0;
    let result: Result<(), StoreError> = retry_with_backoff(&RetryConfig::immediate(), || {
        attempts += 1;
        Err(StoreError::new(ErrorKind::Authentication, "bad user"))
    });
    assert_eq!(result.expect_err("persistent failure").kind, ErrorKind::Authentication);
    assert_eq!(attempts, 1);
}

#[test]
fn retry_gives_up_after_max_attempts() {
    let mut attempts = 0;
    let result: Result<(), StoreError> = retry_with_backoff(&RetryConfig::immediate(), || {
        attempts += 1;
        Err(StoreError::new(ErrorKind::Timeout, "slow store"))
    });
    assert_eq!(result.expect_err("exhausted").kind, ErrorKind::Timeout);
    assert_eq!(attempts, 3);
}

#[test]
fn single_attempt_config_never_retries() {
    let mut attempts = 0;
    let result: Result<(), StoreError> = retry_with_backoff(&RetryConfig::none(), || {
        attempts += 1;
        Err(StoreError::new(ErrorKind::Network, "flaky"))
    });
    assert!(result.is_err());
    assert_eq!(attempts, 1);
}

#[test]
fn transient_and_fatal_kinds_are_classified() {
    assert!(ErrorKind::Network.is_transient());
    assert!(ErrorKind::Timeout.is_transient());
    assert!(ErrorKind::ServiceUnavailable.is_transient());
    assert!(ErrorKind::RateLimited.is_transient());
    assert!(!ErrorKind::Authentication.is_transient());
    assert!(!ErrorKind::NotFound.is_transient());

    assert!(ErrorKind::Authentication.is_fatal());
    assert!(ErrorKind::Authorization.is_fatal());
    assert!(!ErrorKind::Network.is_fatal());
}

#[test]
fn store_targets_parse() -> Result<()> {
    assert_eq!(StoreTarget::from_str("generated/remote")?, StoreTarget::Dir("generated/remote".into()));
    assert_eq!(
        StoreTarget::from_str("webhdfs://namenode:9870")?,
        StoreTarget::WebHdfs { host: "namenode".into(), port: 9870 }
    );

    assert!(StoreTarget::from_str("webhdfs://namenode").is_err());
    assert!(StoreTarget::from_str("webhdfs://:9870").is_err());
    assert!(StoreTarget::from_str("webhdfs://namenode:http").is_err());
    assert!(StoreTarget::from_str("").is_err());
    Ok(())
}

#[test]
fn open_store_builds_the_dir_backend() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = StoreConfig::new(StoreTarget::Dir(dir.path().to_path_buf()));

    let store = open_store(&config)?;
    store.put("/ping.csv", b"x", true)?;
    assert!(store.exists("/ping.csv")?);
    Ok(())
}
