use crate::common::{DomainError, DomainResult};
use crate::domains::editor::MapStore;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const MAP_DIR_ENV: &str = "GREENHOUSE_MAP_DIR";
const MAP_EXTENSION: &str = "json";

/// Stores each map as `<base>/<name>.json`.
pub struct FilesystemMapStore {
    base: PathBuf,
}

impl FilesystemMapStore {
    /// `base` wins; otherwise `GREENHOUSE_MAP_DIR`; otherwise `maps/` under the working directory.
    pub fn new(base: Option<PathBuf>) -> Self {
        let base = base.unwrap_or_else(|| match env::var(MAP_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => PathBuf::from("maps"),
        });
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn path_for(&self, name: &str) -> DomainResult<PathBuf> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '));
        if !valid {
            return Err(DomainError::invalid(format!("invalid map name: {:?}", name)));
        }
        let mut path = self.base.clone();
        path.push(format!("{}.{}", name, MAP_EXTENSION));
        Ok(path)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> DomainError {
    DomainError::InfrastructureError(format!("{}: {}", path.display(), e))
}

impl MapStore for FilesystemMapStore {
    fn save_map(&self, name: &str, json: &str) -> DomainResult<()> {
        let path = self.path_for(name)?;
        if !self.base.exists() {
            fs::create_dir_all(&self.base).map_err(|e| io_error(&self.base, e))?;
        }
        fs::write(&path, json).map_err(|e| io_error(&path, e))
    }

    fn load_map(&self, name: &str) -> DomainResult<String> {
        let path = self.path_for(name)?;
        fs::read_to_string(&path).map_err(|e| io_error(&path, e))
    }

    fn list_maps(&self) -> DomainResult<Vec<String>> {
        if !self.base.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.base).map_err(|e| io_error(&self.base, e))?;
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(MAP_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }
}
