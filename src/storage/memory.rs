use std::{collections::HashMap, sync::RwLock};

use crate::errors::{Result, TrackerError};

use super::KeyValueStore;

/// In-process key-value store. Contents live as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| TrackerError::Storage("memory store lock poisoned".into()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| TrackerError::Storage("memory store lock poisoned".into()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
