//! Integration Tests for the Storage Entry Points
//!
//! Drives the plain facade, the expiring facade and the functional adapter
//! through the public API, on both volatile and file-backed storage.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lsc_storage::adapter::{self, Reply, ACCESS_ERROR, NO_DATA_FOUND};
use lsc_storage::facade::{ManualClock, STATUS_FAILED, STATUS_OK};
use lsc_storage::{
    CallOptions, ExpireAt, ExpiringFacade, FileStore, KeyValueStore, MemoryStore, Result,
    StorageConfig, StorageError, StorageFacade,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// == Helper Types ==

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    name: String,
    age: u32,
}

fn sabbir() -> User {
    User {
        name: "Sabbir".to_string(),
        age: 21,
    }
}

/// Persistent store that refuses every access.
#[derive(Debug)]
struct InaccessibleStore;

impl KeyValueStore for InaccessibleStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>> {
        Err(StorageError::Unavailable("access denied".to_string()))
    }
    fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(StorageError::Unavailable("access denied".to_string()))
    }
    fn remove_item(&mut self, _key: &str) -> Result<()> {
        Err(StorageError::Unavailable("access denied".to_string()))
    }
    fn clear(&mut self) -> Result<()> {
        Err(StorageError::Unavailable("access denied".to_string()))
    }
    fn keys(&self) -> Result<Vec<String>> {
        Err(StorageError::Unavailable("access denied".to_string()))
    }
}

static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn temp_path(name: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "lsc_integration_{}_{}_{}.json",
        name,
        std::process::id(),
        n
    ))
}

fn opts() -> CallOptions {
    CallOptions::default()
}

// == Storage Facade ==

#[test]
fn test_user_scenario_roundtrip() {
    let mut facade = StorageFacade::new(MemoryStore::new());

    assert!(facade.set("user", &sabbir(), &opts()));
    assert_eq!(facade.get::<User>("user", &opts()), Some(sabbir()));
    assert_eq!(
        facade.get::<Value>("user", &opts()),
        Some(json!({"name": "Sabbir", "age": 21}))
    );
}

#[test]
fn test_fallback_roundtrips_when_probe_fails() {
    let mut facade = StorageFacade::new(InaccessibleStore);

    assert!(facade.is_volatile());
    assert_eq!(facade.get::<Value>("memoryTest", &opts()), None);
    assert!(facade.set("user", &sabbir(), &opts()));
    assert_eq!(facade.get::<User>("user", &opts()), Some(sabbir()));
}

#[test]
fn test_file_backed_facade_persists() {
    let path = temp_path("persist");
    {
        let mut facade = StorageFacade::with_fallback(FileStore::open(&path));
        assert!(!facade.is_volatile());
        assert!(facade.set("user", &sabbir(), &opts()));
    }

    let facade = StorageFacade::with_fallback(FileStore::open(&path));
    assert_eq!(facade.get::<User>("user", &opts()), Some(sabbir()));

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_unreadable_file_falls_back() {
    let path = temp_path("corrupt_file");
    fs::write(&path, "][").unwrap();

    let mut facade = StorageFacade::with_fallback(FileStore::open(&path));
    assert!(facade.is_volatile());
    assert!(facade.set("k", &1, &opts()));
    assert_eq!(facade.get::<i32>("k", &opts()), Some(1));

    // The corrupt file is left alone
    assert_eq!(fs::read_to_string(&path).unwrap(), "][");
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_quota_exceeded_on_file_store() {
    let path = temp_path("quota");
    let store = FileStore::open(&path).unwrap().with_quota(32);
    let mut facade = StorageFacade::new(store);

    assert!(facade.set("small", &1, &opts()));
    assert!(!facade.set("big", &"x".repeat(64), &opts()));
    assert_eq!(facade.get::<String>("big", &opts()), None);
    assert_eq!(facade.get::<i32>("small", &opts()), Some(1));

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_remove_clear_and_flush() {
    let mut facade = StorageFacade::volatile(StorageConfig::default());

    facade.set("a", &1, &opts());
    facade.set("b", &2, &opts());
    facade.set("c", &3, &opts());

    facade.remove("a");
    assert_eq!(facade.get::<i32>("a", &opts()), None);

    facade.flush(true);
    assert_eq!(facade.get::<i32>("b", &opts()), None);

    facade.set("d", &4, &opts());
    facade.clear();
    assert_eq!(facade.get::<i32>("d", &opts()), None);
}

// == Expiring Facade ==

#[test]
fn test_expiring_one_minute_window() {
    let clock = ManualClock::new(1_000_000);
    let mut facade = ExpiringFacade::with_clock(
        MemoryStore::new(),
        StorageConfig::with_expire_at(ExpireAt::OneMinute),
        clock.clone(),
    );

    assert_eq!(facade.set("user", &sabbir(), &opts()).status, STATUS_OK);

    clock.advance(Duration::from_millis(30_000));
    assert_eq!(facade.get::<User>("user", &opts()), Some(sabbir()));

    clock.advance(Duration::from_millis(30_001));
    assert_eq!(facade.get::<User>("user", &opts()), None);
}

#[test]
fn test_expiring_envelope_on_disk() {
    let path = temp_path("envelope");
    let clock = ManualClock::new(5_000);
    let mut facade = ExpiringFacade::with_clock(
        FileStore::open(&path).unwrap(),
        StorageConfig::default(),
        clock,
    );

    facade.set("plain", &json!({"a": 1}), &opts());
    facade.set("timed", &"v", &CallOptions::new().expire_at(ExpireAt::TenMinutes));

    let raw = FileStore::open(&path).unwrap();
    let plain: Value = serde_json::from_str(&raw.get_item("plain").unwrap().unwrap()).unwrap();
    let timed: Value = serde_json::from_str(&raw.get_item("timed").unwrap().unwrap()).unwrap();

    assert_eq!(plain, json!({"value": {"a": 1}, "expiresAt": null}));
    assert_eq!(timed, json!({"value": "v", "expiresAt": 605_000}));

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_expiring_quota_failure_reports_400() {
    let path = temp_path("expiring_quota");
    let store = FileStore::open(&path).unwrap().with_quota(16);
    let mut facade = ExpiringFacade::new(store, StorageConfig::default());

    let seen = RefCell::new(Vec::new());
    let outcome = facade.set_with_callback("user", &sabbir(), &opts(), |outcome| {
        seen.borrow_mut().push(outcome.status);
    });

    assert_eq!(outcome.status, STATUS_FAILED);
    assert!(outcome.value.is_none());
    assert!(outcome.message.contains("Quota exceeded"));
    assert_eq!(seen.into_inner(), vec![STATUS_FAILED]);
    assert_eq!(facade.get::<User>("user", &opts()), None);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_expiring_fallback_and_remove_callback() {
    let mut facade = ExpiringFacade::new(InaccessibleStore, StorageConfig::default());
    assert!(facade.is_volatile());

    facade.set("k", &true, &opts());
    assert_eq!(facade.get::<bool>("k", &opts()), Some(true));

    let mut errors = Vec::new();
    facade
        .remove_with_callback("k", |err| errors.push(err.map(|e| e.to_string())))
        .unwrap();
    assert_eq!(errors, vec![None]);
    assert_eq!(facade.get::<bool>("k", &opts()), None);
}

// == Functional Adapter ==

#[test]
fn test_adapter_scenarios() {
    let mut storage = MemoryStore::new();

    let reply = adapter::retrieve::<_, User>(&storage, "user");
    assert_eq!(reply, Reply::Status(NO_DATA_FOUND.to_string()));
    assert_eq!(reply.status(), Some("No data found in local storage"));

    assert_eq!(
        adapter::store(&mut storage, "user", &sabbir()),
        "user stored in local storage!"
    );
    assert_eq!(
        adapter::retrieve::<_, User>(&storage, "user"),
        Reply::Data(sabbir())
    );
}

#[test]
fn test_adapter_has_no_fallback() {
    let mut storage = InaccessibleStore;

    assert_eq!(adapter::store(&mut storage, "user", &sabbir()), ACCESS_ERROR);
    assert_eq!(
        adapter::retrieve::<_, User>(&storage, "user").status(),
        Some(ACCESS_ERROR)
    );
}
