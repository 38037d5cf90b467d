//! Directory-backed repair store - one YAML document per repair
//!
//! Layout: `<root>/<id>.taller.yaml`. Writes go through a temp file and a
//! rename so a crash never leaves a half-written document, and a process-wide
//! mutex serializes read-modify-write cycles.

use serde_yml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::document::{append_item, bump_revision, from_document, merge_fields, revision, to_document};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::store::{check_revision, Patch, RepairStore, StoreError};
use crate::entities::repair::{Repair, RepairField};

/// File suffix of stored documents
pub const DOCUMENT_SUFFIX: &str = ".taller.yaml";

/// Repair documents stored as files in a directory
#[derive(Debug)]
pub struct YamlDirStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl YamlDirStore {
    /// Open a store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `id`
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}{}", id, DOCUMENT_SUFFIX))
    }

    /// Path of the document for `id`, which must be a repair id
    ///
    /// Anything else (other prefixes, path separators, `..`) can't name a
    /// document in this store and is reported as not found.
    fn document_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        match id.parse::<EntityId>() {
            Ok(parsed) if parsed.prefix() == EntityPrefix::Rep => Ok(self.path_for(id)),
            _ => Err(StoreError::NotFound { id: id.to_string() }),
        }
    }

    fn read_doc(&self, id: &str) -> Result<Mapping, StoreError> {
        let path = self.document_path(id)?;
        if !path.is_file() {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        let contents = fs::read_to_string(&path)?;
        serde_yml::from_str(&contents).map_err(|e| StoreError::Corrupt {
            id: id.to_string(),
            message: e.to_string(),
        })
    }

    fn write_doc(&self, id: &str, doc: &Mapping) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let contents = serde_yml::to_string(doc).map_err(|e| StoreError::Yaml {
            message: e.to_string(),
        })?;
        let path = self.document_path(id)?;
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Read, modify and write one document under the write lock
    fn update<F>(&self, id: &str, modify: F) -> Result<Repair, StoreError>
    where
        F: FnOnce(&mut Mapping) -> Result<(), StoreError>,
    {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut doc = self.read_doc(id)?;
        modify(&mut doc)?;
        let rev = bump_revision(&mut doc);
        let repair: Repair = from_document(id, &doc)?;
        self.write_doc(id, &doc)?;
        debug!(%id, revision = rev, path = %self.path_for(id).display(), "yaml store: write");
        Ok(repair)
    }

    /// Document files currently in the store
    pub fn document_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).max_depth(1) {
            let entry = entry.map_err(|e| {
                StoreError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other("directory walk failed")
                }))
            })?;
            if entry.file_type().is_file()
                && entry.file_name().to_string_lossy().ends_with(DOCUMENT_SUFFIX)
            {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl RepairStore for YamlDirStore {
    fn get(&self, id: &str) -> Result<Repair, StoreError> {
        let doc = self.read_doc(id)?;
        from_document(id, &doc)
    }

    fn list(&self) -> Result<Vec<Repair>, StoreError> {
        let mut repairs = Vec::new();
        for path in self.document_paths()? {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            let id = name.trim_end_matches(DOCUMENT_SUFFIX).to_string();
            if self.document_path(&id).is_err() {
                warn!(file = %name, "skipping document with an invalid repair id");
                continue;
            }
            match self.get(&id) {
                Ok(repair) => repairs.push(repair),
                Err(StoreError::Corrupt { id, message }) => {
                    warn!(%id, %message, "skipping unreadable repair document");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(repairs)
    }

    fn create(&self, repair: &Repair) -> Result<(), StoreError> {
        let id = repair.id.to_string();
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        if self.document_path(&id)?.exists() {
            return Err(StoreError::AlreadyExists { id });
        }
        self.write_doc(&id, &to_document(repair)?)?;
        debug!(%id, "yaml store: create");
        Ok(())
    }

    fn patch(&self, id: &str, patch: &Patch) -> Result<Repair, StoreError> {
        self.update(id, |doc| {
            check_revision(id, patch.expected_revision, revision(doc))?;
            merge_fields(doc, &patch.fields);
            Ok(())
        })
    }

    fn append(
        &self,
        id: &str,
        field: RepairField,
        item: Value,
        expected_revision: Option<u64>,
    ) -> Result<Repair, StoreError> {
        self.update(id, |doc| {
            check_revision(id, expected_revision, revision(doc))?;
            append_item(doc, field, item)
        })
    }
}
