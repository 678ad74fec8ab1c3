//! Asset Manager - Reference-counted asset storage
//!
//! Assets live behind `Arc`. The manager holds one strong reference per
//! loaded asset; every frame entry that draws the asset holds another. A
//! `release` drops only the manager's reference, so an asset released by the
//! simulation while a swapped-in frame still draws it stays alive until that
//! frame's entries are cleared.
//!
//! ```text
//! load()     -> strong count 1 (manager)
//! submit     -> strong count 2 (manager + frame entry)
//! release()  -> strong count 1 (frame entry keeps it alive)
//! render     -> entry cleared, asset dropped
//! ```

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::foundation::collections::{HandleMap, TypedHandle};

/// Asset errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// The handle does not refer to a loaded asset
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Asset data failed validation
    #[error("Invalid data for asset '{asset}': {reason}")]
    InvalidData {
        /// Asset name
        asset: String,
        /// Why the data was rejected
        reason: String,
    },

    /// Another thread panicked while holding the asset table
    #[error("Asset table lock poisoned")]
    LockPoisoned,
}

/// Typed handle to an asset held by an [`AssetManager`]
pub type AssetHandle<T> = TypedHandle<T>;

/// Thread-safe store of shared assets
pub struct AssetManager<T> {
    assets: RwLock<HandleMap<Arc<T>>>,
    kind: &'static str,
}

impl<T: Send + Sync> AssetManager<T> {
    /// Create an empty manager; `kind` names the asset type in logs
    pub fn new(kind: &'static str) -> Self {
        Self {
            assets: RwLock::new(HandleMap::with_key()),
            kind,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HandleMap<Arc<T>>>, AssetError> {
        self.assets.read().map_err(|_| AssetError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HandleMap<Arc<T>>>, AssetError> {
        self.assets.write().map_err(|_| AssetError::LockPoisoned)
    }

    /// Take ownership of an asset and return its handle
    pub fn load(&self, asset: T) -> Result<AssetHandle<T>, AssetError> {
        let key = self.write()?.insert(Arc::new(asset));
        log::trace!("Loaded {} {:?}", self.kind, key);
        Ok(AssetHandle::new(key))
    }

    /// Shared reference to a loaded asset
    pub fn get(&self, handle: AssetHandle<T>) -> Result<Arc<T>, AssetError> {
        self.read()?
            .get(handle.key())
            .cloned()
            .ok_or_else(|| AssetError::NotFound(format!("{} {:?}", self.kind, handle.key())))
    }

    /// Drop the manager's reference to an asset
    ///
    /// The asset itself is freed once every outstanding `Arc` is dropped.
    pub fn release(&self, handle: AssetHandle<T>) -> Result<(), AssetError> {
        let asset = self
            .write()?
            .remove(handle.key())
            .ok_or_else(|| AssetError::NotFound(format!("{} {:?}", self.kind, handle.key())))?;

        let outstanding = Arc::strong_count(&asset) - 1;
        if outstanding > 0 {
            log::debug!(
                "Released {} {:?} with {} outstanding reference(s)",
                self.kind,
                handle.key(),
                outstanding
            );
        }
        Ok(())
    }

    /// Strong reference count of a loaded asset, including the manager's own
    pub fn reference_count(&self, handle: AssetHandle<T>) -> Result<usize, AssetError> {
        self.read()?
            .get(handle.key())
            .map(Arc::strong_count)
            .ok_or_else(|| AssetError::NotFound(format!("{} {:?}", self.kind, handle.key())))
    }

    /// Number of loaded assets
    pub fn len(&self) -> usize {
        self.read().map(|assets| assets.len()).unwrap_or(0)
    }

    /// Whether no assets are loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_get_release() {
        let manager = AssetManager::new("texture");
        let handle = manager.load(String::from("brick")).unwrap();

        assert_eq!(*manager.get(handle).unwrap(), "brick");
        assert_eq!(manager.reference_count(handle).unwrap(), 1);

        manager.release(handle).unwrap();
        assert!(manager.is_empty());
        assert!(matches!(manager.get(handle), Err(AssetError::NotFound(_))));
        assert!(manager.release(handle).is_err());
    }

    #[test]
    fn test_outstanding_reference_outlives_release() {
        let manager = AssetManager::new("mesh");
        let handle = manager.load(vec![1u16, 2, 3]).unwrap();

        let in_flight = manager.get(handle).unwrap();
        assert_eq!(manager.reference_count(handle).unwrap(), 2);

        manager.release(handle).unwrap();
        assert_eq!(Arc::strong_count(&in_flight), 1);
        assert_eq!(*in_flight, vec![1, 2, 3]);
    }

    #[test]
    fn test_get_from_other_thread() {
        let manager = Arc::new(AssetManager::new("effect"));
        let handle = manager.load(42u32).unwrap();

        let reader = Arc::clone(&manager);
        let value = std::thread::spawn(move || *reader.get(handle).unwrap())
            .join()
            .unwrap();
        assert_eq!(value, 42);
    }
}
