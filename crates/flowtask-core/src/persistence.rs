use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::kv::KeyValueStore;

pub const LIST_STORAGE_KEY: &str = "flowtask_tasks_v1";
pub const CANVAS_STORAGE_KEY: &str = "flowtask_todos_v1";

/// Mirrors a collection snapshot into a [`KeyValueStore`] under one fixed key.
///
/// Neither direction ever fails: the in-memory collection stays authoritative
/// when storage misbehaves.
pub struct PersistenceSync<T> {
    store: Box<dyn KeyValueStore>,
    key: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> PersistenceSync<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Box<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _entity: PhantomData,
        }
    }

    #[tracing::instrument(skip(self, snapshot), fields(key = self.key, count = snapshot.len()))]
    pub fn save(&self, snapshot: &[T]) {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(err) => {
                error!(error = %err, "failed to serialize snapshot");
                return;
            }
        };

        match self.store.set(self.key, &json) {
            Ok(()) => debug!(bytes = json.len(), "snapshot saved"),
            Err(err) => error!(error = ?err, "failed to save snapshot"),
        }
    }

    #[tracing::instrument(skip(self), fields(key = self.key))]
    pub fn load(&self) -> Vec<T> {
        let raw = match self.store.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored snapshot; starting empty");
                return Vec::new();
            }
            Err(err) => {
                warn!(error = ?err, "failed to read snapshot; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => {
                debug!(count = items.len(), "snapshot loaded");
                items
            }
            Err(err) => {
                warn!(error = %err, "stored snapshot is malformed; starting empty");
                Vec::new()
            }
        }
    }
}
