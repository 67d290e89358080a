//! The property store the host hands to an invocation.
//!
//! An invocation reads a single well-known flag (see `EXECUTION_FAILED_KEY`)
//! and writes one property per successful extraction. The store is passed in
//! explicitly; nothing in this crate keeps one globally.

use std::collections::{BTreeMap, HashMap};

/// Key the host sets once an earlier build step has failed.
pub const EXECUTION_FAILED_KEY: &str = "maven.execution.failed";

/// Mutable string-to-string sink owned by the host.
pub trait PropertyStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String);

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl PropertyStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }

    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl PropertyStore for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }

    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_existing_value() {
        let mut store: HashMap<String, String> = HashMap::new();
        PropertyStore::set(&mut store, "app.name", "first".to_string());
        PropertyStore::set(&mut store, "app.name", "second".to_string());
        assert_eq!(PropertyStore::get(&store, "app.name").as_deref(), Some("second"));
    }

    #[test]
    fn has_reports_presence_even_for_empty_values() {
        let mut store: BTreeMap<String, String> = BTreeMap::new();
        assert!(!PropertyStore::has(&store, EXECUTION_FAILED_KEY));
        PropertyStore::set(&mut store, EXECUTION_FAILED_KEY, String::new());
        assert!(PropertyStore::has(&store, EXECUTION_FAILED_KEY));
    }
}
