//! File-backed repository storing `<data_dir>/maps/<id>.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{DomainError, MindMap, MindMapId};
use crate::infrastructure::traits::{FileSystem, MindMapRepository};

const MAPS_DIR: &str = "maps";
const EXTENSION: &str = "json";

pub struct JsonFileRepository {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl JsonFileRepository {
    pub fn new(fs: Arc<dyn FileSystem>, data_dir: &Path) -> Self {
        Self {
            fs,
            dir: data_dir.join(MAPS_DIR),
        }
    }

    /// Directory holding the map files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `id`; ids that could leave the storage directory are refused.
    pub fn path_for(&self, id: &MindMapId) -> ApplicationResult<PathBuf> {
        if !id.is_file_name_safe() {
            return Err(DomainError::Validation(format!(
                "mind map id '{}' is not a plain name",
                id
            ))
            .into());
        }
        Ok(self.dir.join(format!("{}.{}", id, EXTENSION)))
    }

    fn load(&self, path: &Path) -> ApplicationResult<MindMap> {
        let json = self
            .fs
            .read_to_string(path)
            .with_path_context("read mind map", path)?;
        Ok(MindMap::from_json(&json)?)
    }
}

impl MindMapRepository for JsonFileRepository {
    #[instrument(level = "debug", skip(self, map), fields(map = %map.id()))]
    fn save(&self, map: &MindMap) -> ApplicationResult<MindMap> {
        let path = self.path_for(map.id())?;
        let json = map.to_json()?;
        self.fs
            .write_atomic(&path, &json)
            .with_path_context("write mind map", &path)?;
        debug!("saved {}", path.display());
        Ok(map.clone())
    }

    fn find_by_id(&self, id: &MindMapId) -> ApplicationResult<Option<MindMap>> {
        let path = self.path_for(id)?;
        if !self.fs.is_file(&path) {
            return Ok(None);
        }
        self.load(&path).map(Some)
    }

    fn find_all(&self) -> ApplicationResult<Vec<MindMap>> {
        let files = self
            .fs
            .list_files(&self.dir, EXTENSION)
            .with_path_context("list mind maps", &self.dir)?;
        let mut maps = Vec::with_capacity(files.len());
        for path in files {
            match self.load(&path) {
                Ok(map) => maps.push(map),
                Err(e) => warn!("skipping unreadable mind map {}: {}", path.display(), e),
            }
        }
        maps.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        Ok(maps)
    }

    fn delete(&self, id: &MindMapId) -> ApplicationResult<bool> {
        let path = self.path_for(id)?;
        if !self.fs.exists(&path) {
            return Ok(false);
        }
        self.fs
            .remove_file(&path)
            .with_path_context("delete mind map", &path)?;
        debug!("deleted {}", path.display());
        Ok(true)
    }

    fn exists(&self, id: &MindMapId) -> ApplicationResult<bool> {
        Ok(self.fs.is_file(&self.path_for(id)?))
    }
}
