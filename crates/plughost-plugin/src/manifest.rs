//! Installed-plugin discovery.
//!
//! A plugin is a directory under the plugins root containing a
//! `plugin.toml` manifest. Optional siblings are `service.ini` (service
//! bindings) and `view/` (templates). Directories without a manifest are
//! not plugins and are skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use plughost_core::{AppError, AppResult};

use crate::api::services::BindingMap;
use crate::binder::ServiceBinder;

/// Manifest file name inside each plugin directory.
pub const MANIFEST_FILE: &str = "plugin.toml";
/// Service bindings file name inside each plugin directory.
pub const SERVICE_FILE: &str = "service.ini";
/// Template directory inside each plugin directory.
pub const VIEW_DIR: &str = "view";

/// Contents of a `plugin.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Display name. Defaults to the directory name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    /// Administrative status. `false` makes every dispatch to the plugin fail.
    #[serde(default = "default_true", alias = "status")]
    pub enabled: bool,
    /// Hook names this plugin handles, in declaration order.
    #[serde(default)]
    pub hooks: Vec<String>,
    /// Free-form plugin configuration.
    #[serde(default = "empty_object")]
    pub config: serde_json::Value,
}

impl Default for PluginManifest {
    fn default() -> Self {
        Self {
            name: None,
            version: String::new(),
            description: String::new(),
            author: String::new(),
            enabled: true,
            hooks: Vec::new(),
            config: empty_object(),
        }
    }
}

impl PluginManifest {
    /// Parses manifest text.
    pub fn parse(text: &str) -> AppResult<Self> {
        toml::from_str(text)
            .map_err(|e| AppError::plugin(format!("Invalid {MANIFEST_FILE}: {e}")))
    }
}

/// Everything known about one installed plugin.
#[derive(Debug, Clone, Serialize)]
pub struct PluginDescriptor {
    /// Plugin id: the directory name.
    pub id: String,
    /// Absolute or root-relative plugin directory.
    pub root: PathBuf,
    pub manifest: PluginManifest,
    /// Bindings declared in `service.ini`, empty when the file is absent.
    pub services: BindingMap,
    /// Whether a `service.ini` file was present.
    pub has_service_file: bool,
}

impl PluginDescriptor {
    /// Display name, falling back to the id.
    pub fn name(&self) -> &str {
        self.manifest.name.as_deref().unwrap_or(&self.id)
    }

    pub fn is_enabled(&self) -> bool {
        self.manifest.enabled
    }

    /// Hook names declared by the manifest.
    pub fn hooks(&self) -> &[String] {
        &self.manifest.hooks
    }

    /// Template root: `<plugin>/view/`.
    pub fn view_path(&self) -> PathBuf {
        self.root.join(VIEW_DIR)
    }
}

/// Sorted id → descriptor map produced by a scan.
pub type DescriptorMap = BTreeMap<String, Arc<PluginDescriptor>>;

/// Makes sure the plugins root exists, creating it when missing.
///
/// Failure is logged and ignored; a missing root simply scans as empty.
pub fn ensure_root(root: &Path) {
    if root.is_dir() {
        return;
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    match builder.create(root) {
        Ok(()) => info!(path = %root.display(), "Created plugins directory"),
        Err(e) => warn!(path = %root.display(), error = %e, "Could not create plugins directory"),
    }
}

/// Reads one plugin directory. Returns `None` when it holds no manifest
/// or the manifest cannot be parsed.
pub fn read_plugin_dir(dir: &Path) -> Option<PluginDescriptor> {
    let id = dir.file_name()?.to_str()?.to_string();
    let manifest_path = dir.join(MANIFEST_FILE);

    let text = match fs::read_to_string(&manifest_path) {
        Ok(text) => text,
        Err(_) => {
            debug!(path = %dir.display(), "Directory has no manifest, skipping");
            return None;
        }
    };

    let manifest = match PluginManifest::parse(&text) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(plugin = %id, error = %e, "Skipping plugin with unreadable manifest");
            return None;
        }
    };

    let service_path = dir.join(SERVICE_FILE);
    let has_service_file = service_path.is_file();
    let services = if has_service_file {
        ServiceBinder::read_service_file(&service_path).unwrap_or_else(|e| {
            warn!(plugin = %id, error = %e, "Ignoring unreadable service file");
            BindingMap::new()
        })
    } else {
        BindingMap::new()
    };

    Some(PluginDescriptor {
        id,
        root: dir.to_path_buf(),
        manifest,
        services,
        has_service_file,
    })
}

/// Scans the plugins root and returns every installed plugin, sorted by id.
///
/// A missing root is created first. An unreadable root yields an empty map.
pub fn scan_plugins(root: &Path) -> DescriptorMap {
    ensure_root(root);

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %root.display(), error = %e, "Cannot read plugins directory");
            return DescriptorMap::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    let plugins: DescriptorMap = dirs
        .iter()
        .filter_map(|dir| read_plugin_dir(dir))
        .map(|d| (d.id.clone(), Arc::new(d)))
        .collect();

    debug!(path = %root.display(), count = plugins.len(), "Scanned plugins directory");
    plugins
}

fn default_true() -> bool {
    true
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
