//! Read-only view of the dependency manager that triggered the hook.
//!
//! The importer never talks to the dependency manager directly. Everything it
//! needs (installed packages, where they live, what they autoload, and the
//! vendor directory) comes through [`PackageHost`], so the scan can run
//! against Composer's on-disk state or an in-memory fixture alike.

pub mod composer;

pub use composer::ComposerHost;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Autoload convention a source path is declared under
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderType {
    /// `psr-0`: the namespace is part of the directory layout
    Psr0,
    /// `psr-4`: the declared path is the namespace prefix directory
    Psr4,
    /// `classmap`, `files`, `exclude-from-classmap`, ...
    Other(String),
}

impl LoaderType {
    pub fn from_key(key: &str) -> Self {
        match key {
            "psr-0" => LoaderType::Psr0,
            "psr-4" => LoaderType::Psr4,
            other => LoaderType::Other(other.to_string()),
        }
    }
}

/// One namespace prefix and the relative paths declared for it
#[derive(Debug, Clone, PartialEq)]
pub struct AutoloadEntry {
    pub namespace: String,
    pub paths: Vec<String>,
}

/// Entries declared under one loader type, in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct AutoloadSection {
    pub loader: LoaderType,
    pub entries: Vec<AutoloadEntry>,
}

/// Where a package's source code lives, keyed by loading convention
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AutoloadMap {
    pub sections: Vec<AutoloadSection>,
}

/// Install location as the host recorded it
#[derive(Debug, Clone, PartialEq)]
pub enum InstallLocation {
    /// Path relative to the host's metadata directory
    Declared(String),
    /// Not recorded; the host's default layout applies
    Default,
    /// Explicitly nothing on disk (metapackages)
    NotInstalled,
}

/// Metadata record for one installed dependency
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDescriptor {
    pub name: String,
    pub location: InstallLocation,
    pub autoload: AutoloadMap,
}

/// Injected, read-only dependency manager state
pub trait PackageHost {
    /// Installed packages in the host's enumeration order
    fn local_packages(&self) -> Result<Vec<PackageDescriptor>>;

    /// Absolute install path, or None when the package has nothing on disk
    fn install_path(&self, package: &PackageDescriptor) -> Option<PathBuf>;

    /// Resolved vendor/dependency directory
    fn vendor_dir(&self) -> &Path;

    /// The project root is the directory holding the vendor directory
    fn project_root(&self) -> PathBuf {
        let vendor_dir = self.vendor_dir();
        vendor_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(vendor_dir)
            .to_path_buf()
    }
}

/// Fixed package list for tests where enumeration order must be controlled
#[cfg(test)]
pub struct StaticHost {
    pub vendor_dir: PathBuf,
    pub packages: Vec<(PackageDescriptor, Option<PathBuf>)>,
}

#[cfg(test)]
impl StaticHost {
    pub fn new(vendor_dir: impl Into<PathBuf>) -> Self {
        Self {
            vendor_dir: vendor_dir.into(),
            packages: Vec::new(),
        }
    }

    /// Add a package installed at `install_path` with the given autoload sections
    pub fn package(
        mut self,
        name: &str,
        install_path: impl Into<PathBuf>,
        sections: Vec<AutoloadSection>,
    ) -> Self {
        let descriptor = PackageDescriptor {
            name: name.to_string(),
            location: InstallLocation::Default,
            autoload: AutoloadMap { sections },
        };
        self.packages.push((descriptor, Some(install_path.into())));
        self
    }
}

#[cfg(test)]
impl PackageHost for StaticHost {
    fn local_packages(&self) -> Result<Vec<PackageDescriptor>> {
        Ok(self.packages.iter().map(|(p, _)| p.clone()).collect())
    }

    fn install_path(&self, package: &PackageDescriptor) -> Option<PathBuf> {
        self.packages
            .iter()
            .find(|(p, _)| p.name == package.name)
            .and_then(|(_, path)| path.clone())
    }

    fn vendor_dir(&self) -> &Path {
        &self.vendor_dir
    }
}

/// Shorthand for building autoload sections in tests
#[cfg(test)]
pub fn section(loader: &str, entries: &[(&str, &[&str])]) -> AutoloadSection {
    AutoloadSection {
        loader: LoaderType::from_key(loader),
        entries: entries
            .iter()
            .map(|(namespace, paths)| AutoloadEntry {
                namespace: namespace.to_string(),
                paths: paths.iter().map(|p| p.to_string()).collect(),
            })
            .collect(),
    }
}
