//! lsc - command line front end for the expiring storage facade
//!
//! Reads and writes JSON values in a file-backed store.
//!
//! # Usage
//! ```text
//! lsc set <key> <json> [expire]   e.g. lsc set user '{"name":"Sabbir"}' 5m
//! lsc get <key>
//! lsc ttl <key>
//! lsc remove <key>
//! lsc clear
//! ```

use anyhow::{bail, Context};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lsc_storage::{CallOptions, ExpiringFacade, FileStore, FileStoreConfig, StorageConfig};

const USAGE: &str = "usage: lsc <set <key> <json> [expire] | get <key> | ttl <key> | remove <key> | clear>";

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lsc_storage=info,lsc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = StorageConfig::from_env();
    let store_config = FileStoreConfig::from_env();
    info!(
        "Configuration loaded: path={}, quota={} bytes, expire_at={:?}",
        store_config.path.display(),
        store_config.quota_bytes,
        config.expire_at
    );

    let mut facade = open_facade(&store_config, config);
    if facade.is_volatile() {
        info!("Running on volatile storage, changes will not be saved");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["set", key, json, rest @ ..] => {
            let value: Value = serde_json::from_str(json)
                .with_context(|| format!("value for '{}' is not valid JSON", key))?;
            let options = match rest {
                [] => CallOptions::default(),
                [label] => CallOptions::new().expire_label(label),
                _ => bail!(USAGE),
            };

            let outcome = facade.set(key, &value, &options);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.is_ok() {
                bail!(outcome.message);
            }
        }
        ["get", key] => {
            let value = facade.get::<Value>(key, &CallOptions::default());
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        ["ttl", key] => match facade.ttl_remaining(key) {
            Some(remaining) => println!("{}", remaining.as_secs()),
            None => println!("null"),
        },
        ["remove", key] => {
            facade.remove(key)?;
            println!("Key '{}' removed", key);
        }
        ["clear"] => {
            facade.clear();
            println!("Storage cleared");
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

/// Opens the file store, falling back to memory if it cannot be opened.
fn open_facade(store_config: &FileStoreConfig, config: StorageConfig) -> ExpiringFacade {
    match FileStore::open(&store_config.path) {
        Ok(store) => ExpiringFacade::new(store.with_quota(store_config.quota_bytes), config),
        Err(e) => {
            warn!("Cannot open {}: {}", store_config.path.display(), e);
            ExpiringFacade::volatile(config)
        }
    }
}
