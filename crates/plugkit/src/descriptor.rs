//! Plugin descriptors - the check/do/undo contract loaded from a manifest
//!
//! A manifest is a JSON file holding one plugin:
//!
//! ```json
//! {
//!   "id": "Disable telemetry",
//!   "info": "Turns off diagnostic data.\\nRequires admin.",
//!   "category": "Privacy",
//!   "check": ["reg query ... | find /c \"0x0\""],
//!   "do": ["reg add ..."],
//!   "undo": ["reg delete ..."],
//!   "defaultState": false
//! }
//! ```
//!
//! The older `PlugID`/`PlugInfo`/`PlugCategory`/`PlugCheck`/`PlugDo`/
//! `PlugUndo`/`PlugDefaultState` spellings are accepted as aliases.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Bucket for plugins that declare no category
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Immutable description of one plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub id: String,
    /// Free text; literal `\n` sequences mark line breaks
    pub info: String,
    pub category: String,
    pub probe_commands: Vec<String>,
    pub apply_commands: Vec<String>,
    pub undo_commands: Vec<String>,
    pub default_state: Option<bool>,
    /// Manifest file this descriptor was loaded from
    pub source: Option<PathBuf>,
}

/// On-disk shape of a manifest. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(alias = "PlugID")]
    id: Option<String>,
    #[serde(default, alias = "PlugInfo")]
    info: Option<String>,
    #[serde(default, alias = "PlugCategory")]
    category: Option<String>,
    #[serde(default, alias = "PlugCheck")]
    check: Option<Vec<String>>,
    #[serde(default, rename = "do", alias = "PlugDo")]
    apply: Option<Vec<String>>,
    #[serde(default, alias = "PlugUndo")]
    undo: Option<Vec<String>>,
    #[serde(default, rename = "defaultState", alias = "PlugDefaultState")]
    default_state: Option<bool>,
}

impl PluginDescriptor {
    /// Create a descriptor with no commands in the default category
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            info: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            probe_commands: Vec::new(),
            apply_commands: Vec::new(),
            undo_commands: Vec::new(),
            default_state: None,
            source: None,
        }
    }

    /// Set the category, falling back to [`DEFAULT_CATEGORY`] when blank
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = normalize_category(Some(category.into()));
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_probe<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.probe_commands = commands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_apply<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply_commands = commands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_undo<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.undo_commands = commands.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_state(mut self, state: bool) -> Self {
        self.default_state = Some(state);
        self
    }

    /// Parse a descriptor from manifest text.
    ///
    /// `path` is only used for error messages and the `source` field.
    pub fn from_json(text: &str, path: &Path) -> Result<Self> {
        // Manifests saved by Windows editors often carry a BOM
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let raw: RawManifest = serde_json::from_str(text).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;

        let id = raw
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::InvalidManifest {
                path: path.to_path_buf(),
                reason: "missing plugin id".to_string(),
            })?;

        Ok(Self {
            id,
            info: raw.info.unwrap_or_default(),
            category: normalize_category(raw.category),
            probe_commands: raw.check.unwrap_or_default(),
            apply_commands: raw.apply.unwrap_or_default(),
            undo_commands: raw.undo.unwrap_or_default(),
            default_state: raw.default_state,
            source: Some(path.to_path_buf()),
        })
    }

    /// Load a descriptor from a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Human-readable information with `\n` escapes expanded
    pub fn information(&self) -> String {
        self.info.replace("\\n", "\n")
    }

    /// Whether the descriptor has any probe command
    pub fn has_probe(&self) -> bool {
        !self.probe_commands.is_empty()
    }
}

fn normalize_category(category: Option<String>) -> String {
    match category {
        Some(c) if !c.trim().is_empty() => c.trim().to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// An externally authored script run as a whole.
///
/// Scripts have no probe and no undo: reverting one is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptPlugin {
    pub path: PathBuf,
}

impl ScriptPlugin {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name used for display, falling back to the full path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// List `*.ps1` scripts directly inside `dir`, sorted by file name.
///
/// A missing directory yields no scripts.
pub fn discover_scripts(dir: &Path) -> Vec<ScriptPlugin> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("No scripts loaded from {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut scripts: Vec<ScriptPlugin> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ps1"))
        })
        .map(ScriptPlugin::from_path)
        .collect();

    scripts.sort_by(|a, b| a.path.cmp(&b.path));
    scripts
}
