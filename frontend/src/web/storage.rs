//! LocalStorage 封装模块
//!
//! Raw string access to `localStorage` through `gloo-storage`; the session
//! gate does its own JSON encoding.

use aqargo_admin::error::{AdminError, AdminResult};
use aqargo_admin::session::KeyValueStore;
use gloo_storage::{LocalStorage, Storage};

/// Browser `localStorage` as a [`KeyValueStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> AdminResult<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| AdminError::Storage(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) {
        LocalStorage::delete(key);
    }
}
