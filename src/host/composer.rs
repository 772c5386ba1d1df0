use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::{
    AutoloadEntry, AutoloadMap, AutoloadSection, InstallLocation, LoaderType, PackageDescriptor,
    PackageHost,
};
use crate::traits::FileSystem;

const COMPOSER_JSON: &str = "composer.json";
const DEFAULT_VENDOR_DIR: &str = "vendor";
const METADATA_DIR: &str = "composer";
const INSTALLED_JSON: &str = "installed.json";

/// Subset of the root composer.json this tool cares about
#[derive(Debug, Default, Deserialize)]
struct ComposerJson {
    #[serde(default)]
    config: ComposerConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ComposerConfig {
    #[serde(rename = "vendor-dir")]
    vendor_dir: Option<String>,
}

/// installed.json is a bare array before Composer 2 and an object after
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstalledRepository {
    Legacy(Vec<Map<String, Value>>),
    Current { packages: Vec<Map<String, Value>> },
}

impl InstalledRepository {
    fn into_packages(self) -> Vec<Map<String, Value>> {
        match self {
            InstalledRepository::Legacy(packages) => packages,
            InstalledRepository::Current { packages } => packages,
        }
    }
}

/// Composer's installed state, read from the vendor directory
pub struct ComposerHost {
    fs: Arc<dyn FileSystem>,
    vendor_dir: PathBuf,
}

impl ComposerHost {
    /// Create a host over an already-resolved vendor directory
    pub fn new(fs: Arc<dyn FileSystem>, vendor_dir: PathBuf) -> Self {
        Self {
            fs,
            vendor_dir: normalize(&vendor_dir),
        }
    }

    /// Resolve the vendor directory the way Composer does for `working_dir`.
    ///
    /// An explicit override wins, then `config.vendor-dir` from composer.json,
    /// then `vendor`. Relative values are taken from `working_dir`.
    pub fn discover(
        fs: Arc<dyn FileSystem>,
        working_dir: &Path,
        vendor_override: Option<&Path>,
    ) -> Result<Self> {
        let vendor_dir = match vendor_override {
            Some(dir) => working_dir.join(dir),
            None => {
                let configured = Self::configured_vendor_dir(&*fs, working_dir)?;
                working_dir.join(configured.as_deref().unwrap_or(DEFAULT_VENDOR_DIR))
            }
        };

        Ok(Self::new(fs, vendor_dir))
    }

    fn configured_vendor_dir(fs: &dyn FileSystem, working_dir: &Path) -> Result<Option<String>> {
        let manifest = working_dir.join(COMPOSER_JSON);
        if !fs.exists(&manifest) {
            return Ok(None);
        }

        let content = fs.read_to_string(&manifest)?;
        let parsed: ComposerJson = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", manifest))?;

        Ok(parsed.config.vendor_dir)
    }

    fn installed_json(&self) -> PathBuf {
        self.vendor_dir.join(METADATA_DIR).join(INSTALLED_JSON)
    }
}

impl PackageHost for ComposerHost {
    fn local_packages(&self) -> Result<Vec<PackageDescriptor>> {
        let path = self.installed_json();
        if !self.fs.exists(&path) {
            return Ok(Vec::new());
        }

        let content = self.fs.read_to_string(&path)?;
        let repository: InstalledRepository = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;

        repository
            .into_packages()
            .into_iter()
            .map(|raw| {
                parse_package(&raw).with_context(|| format!("Invalid package entry in {:?}", path))
            })
            .collect()
    }

    fn install_path(&self, package: &PackageDescriptor) -> Option<PathBuf> {
        match &package.location {
            InstallLocation::Declared(relative) => {
                Some(normalize(&self.vendor_dir.join(METADATA_DIR).join(relative)))
            }
            InstallLocation::Default => Some(self.vendor_dir.join(&package.name)),
            InstallLocation::NotInstalled => None,
        }
    }

    fn vendor_dir(&self) -> &Path {
        &self.vendor_dir
    }
}

fn parse_package(raw: &Map<String, Value>) -> Result<PackageDescriptor> {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .context("Package entry has no name")?
        .to_string();

    let location = match raw.get("install-path") {
        None => InstallLocation::Default,
        Some(Value::Null) => InstallLocation::NotInstalled,
        Some(Value::String(path)) => InstallLocation::Declared(path.clone()),
        Some(other) => anyhow::bail!("Package {} has invalid install-path: {}", name, other),
    };

    let autoload = match raw.get("autoload") {
        Some(Value::Object(map)) => parse_autoload(map),
        _ => AutoloadMap::default(),
    };

    Ok(PackageDescriptor {
        name,
        location,
        autoload,
    })
}

fn parse_autoload(map: &Map<String, Value>) -> AutoloadMap {
    let sections = map
        .iter()
        .map(|(loader, items)| AutoloadSection {
            loader: LoaderType::from_key(loader),
            entries: parse_entries(items),
        })
        .collect();

    AutoloadMap { sections }
}

fn parse_entries(items: &Value) -> Vec<AutoloadEntry> {
    match items {
        // psr-0 / psr-4: namespace => path | [paths]
        Value::Object(map) => map
            .iter()
            .map(|(namespace, paths)| AutoloadEntry {
                namespace: namespace.clone(),
                paths: string_list(paths),
            })
            .collect(),
        // classmap / files: plain list, no namespace
        Value::Array(_) => vec![AutoloadEntry {
            namespace: String::new(),
            paths: string_list(items),
        }],
        _ => Vec::new(),
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(values) => values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Lexically resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
