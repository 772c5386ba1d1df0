use std::path::{Path, PathBuf};

use crate::host::{AutoloadMap, LoaderType};

/// Turns a package's autoload declarations into candidate source roots
pub struct PackagePathResolver;

impl PackagePathResolver {
    /// Relative source paths declared by `autoload`, in declaration order.
    ///
    /// `psr-0` paths are the declared path with the namespace key appended
    /// verbatim; `psr-4` paths are used as declared. Other loaders are
    /// ignored. Duplicates are kept.
    pub fn source_paths(autoload: &AutoloadMap) -> Vec<String> {
        let mut paths = Vec::new();

        for section in &autoload.sections {
            for entry in &section.entries {
                for path in &entry.paths {
                    match section.loader {
                        LoaderType::Psr0 => paths.push(format!("{}{}", path, entry.namespace)),
                        LoaderType::Psr4 => paths.push(path.clone()),
                        LoaderType::Other(_) => {}
                    }
                }
            }
        }

        paths
    }

    /// Absolute candidate roots for a package installed at `install_path`
    pub fn candidate_roots(install_path: &Path, autoload: &AutoloadMap) -> Vec<PathBuf> {
        Self::source_paths(autoload)
            .iter()
            .map(|relative| install_path.join(relative.trim_start_matches('/')))
            .collect()
    }
}
