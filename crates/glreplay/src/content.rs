use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glreplay_extras::ResourceId;
use thiserror::Error;

use crate::error::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("content resolution cancelled")]
    Cancelled,
    #[error("content {0} not found")]
    NotFound(ResourceId),
    #[error("content resolution failed: {0}")]
    Failed(String),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cancelled => ErrorKind::Cancelled,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Failed(_) => ErrorKind::Internal,
        }
    }
}

/// Turns a content identifier into bytes.
pub trait ContentResolver: Send + Sync {
    fn resolve(&self, id: &ResourceId) -> Result<Arc<[u8]>, ResolveError>;
}

/// In-memory content-addressed blob store.
///
/// Identifiers are BLAKE3 digests of the stored bytes, so storing identical bytes twice yields the
/// same identifier and a single blob. Each [`store`](Self::store) takes a reference on the blob and
/// each [`release`](Self::release) drops one; the blob is freed when the last reference goes.
#[derive(Debug, Default)]
pub struct ContentStore {
    blobs: Mutex<HashMap<ResourceId, Blob>>,
}

#[derive(Debug)]
struct Blob {
    bytes: Arc<[u8]>,
    refs: usize,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, bytes: impl Into<Arc<[u8]>>) -> ResourceId {
        let bytes = bytes.into();
        let id = ResourceId::of(&bytes);
        self.lock()
            .entry(id)
            .or_insert_with(|| Blob { bytes, refs: 0 })
            .refs += 1;
        id
    }

    /// Drops one reference on `id`. Returns whether the blob was freed.
    pub fn release(&self, id: &ResourceId) -> bool {
        let mut blobs = self.lock();
        let Some(blob) = blobs.get_mut(id) else {
            return false;
        };
        blob.refs = blob.refs.saturating_sub(1);
        if blob.refs > 0 {
            return false;
        }
        blobs.remove(id);
        true
    }

    pub fn get(&self, id: &ResourceId) -> Option<Arc<[u8]>> {
        self.lock().get(id).map(|blob| Arc::clone(&blob.bytes))
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ResourceId, Blob>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ContentResolver for ContentStore {
    fn resolve(&self, id: &ResourceId) -> Result<Arc<[u8]>, ResolveError> {
        self.get(id).ok_or(ResolveError::NotFound(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_share_one_blob() {
        let store = ContentStore::new();
        let a = store.store(vec![1u8, 2, 3]);
        let b = store.store(&[1u8, 2, 3][..]);
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(&*store.resolve(&a).unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn blob_lives_until_last_release() {
        let store = ContentStore::new();
        let id = store.store(vec![9u8; 4]);
        store.store(vec![9u8; 4]);

        assert!(!store.release(&id));
        assert!(store.contains(&id));
        assert!(store.release(&id));
        assert!(store.is_empty());
        assert!(!store.release(&id));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = ContentStore::new();
        let id = ResourceId::of(b"missing");
        assert_eq!(store.resolve(&id).unwrap_err(), ResolveError::NotFound(id));
        assert_eq!(ResolveError::NotFound(id).kind(), ErrorKind::NotFound);
    }
}
