use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{MindMap, MindMapId};
use crate::infrastructure::traits::MindMapRepository;

/// Repository kept in process memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    maps: Mutex<BTreeMap<MindMapId, MindMap>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ApplicationResult<MutexGuard<'_, BTreeMap<MindMapId, MindMap>>> {
        self.maps.lock().map_err(|e| ApplicationError::OperationFailed {
            context: "lock in-memory repository".to_string(),
            source: e.to_string().into(),
        })
    }
}

impl MindMapRepository for InMemoryRepository {
    fn save(&self, map: &MindMap) -> ApplicationResult<MindMap> {
        self.lock()?.insert(map.id().clone(), map.clone());
        Ok(map.clone())
    }

    fn find_by_id(&self, id: &MindMapId) -> ApplicationResult<Option<MindMap>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn find_all(&self) -> ApplicationResult<Vec<MindMap>> {
        let mut maps: Vec<MindMap> = self.lock()?.values().cloned().collect();
        maps.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        Ok(maps)
    }

    fn delete(&self, id: &MindMapId) -> ApplicationResult<bool> {
        Ok(self.lock()?.remove(id).is_some())
    }

    fn exists(&self, id: &MindMapId) -> ApplicationResult<bool> {
        Ok(self.lock()?.contains_key(id))
    }
}
