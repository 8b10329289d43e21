use std::collections::HashMap;

/// The in-memory key-value store.
///
/// Holds the whole mapping for the life of the process; nothing is persisted.
/// Exactly one request is in flight at a time, so no locking is needed.
#[derive(Debug, Default)]
pub struct KvStore {
    map: HashMap<String, String>,
}

impl KvStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, overwriting any previous value.
    pub fn put(&mut self, key: String, value: String) {
        self.map.insert(key, value);
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    /// Removes `key`, returning the value it held.
    ///
    /// Removing an absent key is a no-op, not an error.
    pub fn delete(&mut self, key: &str) -> Option<String> {
        self.map.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_round_trips() {
        let mut store = KvStore::new();
        store.put("apple".to_owned(), "red".to_owned());
        assert_eq!(store.get("apple"), Some("red".to_owned()));
    }

    #[test]
    fn put_overwrites_existing_value() {
        let mut store = KvStore::new();
        store.put("kiwi".to_owned(), "green".to_owned());
        store.put("kiwi".to_owned(), "yellow".to_owned());
        assert_eq!(store.get("kiwi"), Some("yellow".to_owned()));
    }

    #[test]
    fn delete_returns_removed_value() {
        let mut store = KvStore::new();
        store.put("grape".to_owned(), "purple".to_owned());
        assert_eq!(store.delete("grape"), Some("purple".to_owned()));
        assert_eq!(store.get("grape"), None);
    }

    #[test]
    fn delete_of_missing_key_is_a_noop() {
        let mut store = KvStore::new();
        store.put("apple".to_owned(), "red".to_owned());
        assert_eq!(store.delete("mango"), None);
        assert_eq!(store.get("apple"), Some("red".to_owned()));
    }
}
