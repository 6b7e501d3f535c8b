use gloo_storage::{LocalStorage, Storage};

use crate::config::NAME_STORAGE_KEY;

/// String key-value storage holding the display name.
pub trait NameStore {
    fn get_raw(&self, key: &str) -> Option<String>;
    fn set_raw(&self, key: &str, value: &str);
}

/// The browser's `localStorage`, read and written as bare strings.
pub struct BrowserStore;

impl NameStore for BrowserStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set_raw(&self, key: &str, value: &str) {
        let _ = LocalStorage::raw().set_item(key, value);
    }
}

/// Last display name used on this browser, or empty.
pub fn load_display_name(store: &impl NameStore) -> String {
    let Some(raw) = store.get_raw(NAME_STORAGE_KEY) else {
        return String::new();
    };
    // Older builds stored the name JSON-encoded.
    serde_json::from_str::<String>(&raw).unwrap_or(raw)
}

pub fn save_display_name(store: &impl NameStore, name: &str) {
    store.set_raw(NAME_STORAGE_KEY, name);
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct MemoryStore(RefCell<HashMap<String, String>>);

    impl NameStore for MemoryStore {
        fn get_raw(&self, key: &str) -> Option<String> {
            self.0.borrow().get(key).cloned()
        }

        fn set_raw(&self, key: &str, value: &str) {
            self.0.borrow_mut().insert(key.to_string(), value.to_string());
        }
    }

    #[test]
    fn name_is_stored_as_bare_string() {
        let store = MemoryStore::default();
        save_display_name(&store, "ann");
        assert_eq!(store.get_raw("name").as_deref(), Some("ann"));
        assert_eq!(load_display_name(&store), "ann");
    }

    #[test]
    fn json_encoded_names_still_load() {
        let store = MemoryStore::default();
        store.set_raw("name", "\"bob\"");
        assert_eq!(load_display_name(&store), "bob");
    }

    #[test]
    fn missing_name_loads_empty() {
        assert_eq!(load_display_name(&MemoryStore::default()), "");
    }
}
