//! # Configuration
//!
//! A string key/value store in the spirit of `app.set()` / `app.get()`.
//! Applications fill it from wherever they like (the clinic server reads
//! environment variables); components read typed values from a
//! [`ClinicConfigSnapshot`].
//!
//! ```rust
//! use clinic_core::ClinicApp;
//! let app = ClinicApp::<(), ()>::new();
//!
//! app.set("db.max_connections", "20");
//! app.set("tenant.header", "x-tenant-slug");
//!
//! let cfg = app.config_snapshot();
//! assert_eq!(cfg.get_u64("db.max_connections"), Some(20));
//! assert_eq!(cfg.get("tenant.header"), Some("x-tenant-slug"));
//! ```

use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ClinicConfig {
    values: HashMap<String, String>,
}

impl ClinicConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> ClinicConfigSnapshot {
        ClinicConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClinicConfigSnapshot {
    map: HashMap<String, String>,
}

impl ClinicConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.trim().parse::<bool>().ok())
    }

    /// A whole number of seconds.
    pub fn get_secs(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_ignore_unparseable_values() {
        let mut cfg = ClinicConfig::new();
        cfg.set("db.idle_timeout_secs", " 30 ");
        cfg.set("db.max_connections", "many");
        cfg.set("flag", "true");

        let snap = cfg.snapshot();
        assert_eq!(snap.get_secs("db.idle_timeout_secs"), Some(Duration::from_secs(30)));
        assert_eq!(snap.get_u64("db.max_connections"), None);
        assert_eq!(snap.get_bool("flag"), Some(true));
        assert_eq!(snap.get("missing"), None);
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let mut cfg = ClinicConfig::new();
        cfg.set("a", "1");
        let snap = cfg.snapshot();
        cfg.set("a", "2");
        assert_eq!(snap.get("a"), Some("1"));
        assert!(cfg.has("a"));
    }
}
