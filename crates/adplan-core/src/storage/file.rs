//! File-based storage: one binary `.adp` plan file per id.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::codec::{decode_plan, encode_plan};
use crate::plan::Plan;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of plan files.
pub const PLAN_FILE_EXTENSION: &str = "adp";

/// Stores plans as `.adp` files in a directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/adplan/plans/`
    /// On Windows: `%LOCALAPPDATA%\adplan\plans\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("adplan").join("plans"))
    }

    /// File path for a plan id. Characters unsafe in file names become `_`.
    fn plan_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.{}", safe_id, PLAN_FILE_EXTENSION))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, plan: &Plan) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.plan_path(id);
        let encoded = encode_plan(plan);
        Box::pin(async move {
            let bytes = encoded?;
            fs::write(&path, bytes).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::info!("Saved plan to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Plan>> {
        let path = self.plan_path(id);
        let id = id.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let bytes = fs::read(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;
            decode_plan(&bytes).map_err(|e| {
                log::warn!("Rejected plan file {}: {}", path.display(), e);
                StorageError::Codec(e)
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.plan_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == PLAN_FILE_EXTENSION))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.plan_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecError, PLAN_SIGNATURE};
    use crate::plan::Page;
    use crate::shapes::{Circle, DrawableStyle};
    use kurbo::Point;
    use pollster::block_on;
    use tempfile::tempdir;

    fn sample_plan() -> Plan {
        let circle = Circle::new(Point::new(10.0, 20.0), 4.0, DrawableStyle::default());
        Plan::with_pages(
            "Cellar",
            vec![Page::with_drawables("1", vec![circle.into()]), Page::new("2")],
        )
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let plan = sample_plan();

        block_on(storage.save("cellar", &plan)).unwrap();
        let bytes = fs::read(dir.path().join("cellar.adp")).unwrap();
        assert_eq!(&bytes[..4], &PLAN_SIGNATURE);

        let loaded = block_on(storage.load("cellar")).unwrap();
        assert_eq!(loaded.name, "Cellar");
        assert_eq!(loaded.pages, plan.pages);
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("broken.adp"), b"JUNKJUNK").unwrap();
        let result = block_on(storage.load("broken"));
        assert!(matches!(result, Err(StorageError::Codec(CodecError::InvalidSignature))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let plan = sample_plan();
        block_on(storage.save("plan2", &plan)).unwrap();
        block_on(storage.save("plan1", &plan)).unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        assert_eq!(block_on(storage.list()).unwrap(), vec!["plan1", "plan2"]);

        block_on(storage.delete("plan1")).unwrap();
        assert!(!block_on(storage.exists("plan1")).unwrap());
        assert!(block_on(storage.exists("plan2")).unwrap());
    }

    #[test]
    fn test_file_storage_sanitizes_ids() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save("../escape", &sample_plan())).unwrap();
        assert!(dir.path().join("___escape.adp").exists());
    }
}
