use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::collections::{HashMap, HashSet};
#[cfg(test)]
use std::sync::RwLock;

/// Trait for filesystem operations to enable testing with mocks
pub trait FileSystem: Send + Sync {
    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Create directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy a file byte-for-byte; an existing destination is overwritten
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read directory entries (never includes `.` or `..`)
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Real filesystem implementation using std::fs
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {:?}", path))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::copy(from, to)
            .with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory: {:?}", path))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            paths.push(entry.path());
        }

        Ok(paths)
    }
}

/// Mock filesystem implementation for testing (in-memory)
#[cfg(test)]
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, String>>,
    directories: RwLock<HashSet<PathBuf>>,
    failing_copies: RwLock<HashSet<PathBuf>>,
    copies: RwLock<Vec<(PathBuf, PathBuf)>>,
}

#[cfg(test)]
#[allow(dead_code)]
impl MockFileSystem {
    /// Create new empty mock filesystem
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            directories: RwLock::new(HashSet::new()),
            failing_copies: RwLock::new(HashSet::new()),
            copies: RwLock::new(Vec::new()),
        }
    }

    /// Seed a file, creating its parent directories
    pub fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }

        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    /// Get captured file contents for testing assertions
    pub fn get_file_contents(&self, path: &Path) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// Check if file was written
    pub fn has_file(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    /// Files directly inside `dir`, sorted
    pub fn files_in(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .files
            .read()
            .unwrap()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect();
        files.sort();
        files
    }

    /// Make every copy targeting `destination` fail with an I/O error
    pub fn fail_copy_to(&self, destination: &Path) {
        self.failing_copies
            .write()
            .unwrap()
            .insert(destination.to_path_buf());
    }

    /// Every (from, to) pair passed to `copy`, in call order
    pub fn copy_calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.copies.read().unwrap().clone()
    }
}

#[cfg(test)]
impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .with_context(|| format!("File not found in mock filesystem: {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut directories = self.directories.write().unwrap();
        let mut current = Some(path);
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            directories.insert(dir.to_path_buf());
            current = dir.parent();
        }

        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.copies
            .write()
            .unwrap()
            .push((from.to_path_buf(), to.to_path_buf()));

        if self.failing_copies.read().unwrap().contains(to) {
            anyhow::bail!("Permission denied (os error 13)");
        }

        let contents = self.read_to_string(from)?;

        let parent_exists = to
            .parent()
            .map(|p| self.directories.read().unwrap().contains(p))
            .unwrap_or(false);
        if !parent_exists {
            anyhow::bail!("No such file or directory (os error 2): {:?}", to);
        }

        self.files
            .write()
            .unwrap()
            .insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
            || self.directories.read().unwrap().contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.read().unwrap().contains(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !self.is_dir(path) {
            anyhow::bail!("Directory not found in mock filesystem: {:?}", path);
        }

        let files = self.files.read().unwrap();
        let directories = self.directories.read().unwrap();

        let mut entries: Vec<PathBuf> = files
            .keys()
            .chain(directories.iter())
            .filter(|entry| entry.parent() == Some(path))
            .cloned()
            .collect();

        // HashMap order is random; a real listing is at least stable
        entries.sort();
        Ok(entries)
    }
}
