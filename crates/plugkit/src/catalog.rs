//! Plugin catalog - discovers manifests, probes them, groups by category

use crate::descriptor::PluginDescriptor;
use crate::probe::probe;
use crate::runner::CommandRunner;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default number of probe threads during discovery
pub const DEFAULT_PROBE_JOBS: usize = 4;

/// A discovered plugin with its probed activation state
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub descriptor: Arc<PluginDescriptor>,
    pub activation_state: bool,
    pub category: String,
}

impl CatalogItem {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }
}

/// Items sharing a category, in discovery order
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub items: Vec<CatalogItem>,
}

/// A manifest that was skipped during discovery
#[derive(Debug, Clone)]
pub struct SkippedManifest {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one discovery pass
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    skipped: Vec<SkippedManifest>,
}

impl Catalog {
    /// Scan `dir` for manifests with [`DEFAULT_PROBE_JOBS`] probe threads
    pub fn discover(dir: &Path, runner: &dyn CommandRunner) -> Self {
        Self::discover_with_jobs(dir, runner, DEFAULT_PROBE_JOBS)
    }

    /// Scan `dir` for manifests and probe each one.
    ///
    /// Only `*.json` files directly inside `dir` are considered, in file
    /// name order. Names starting with `_` are filter files and are never
    /// parsed. A manifest that fails to load is logged and skipped. Every
    /// call is a full re-scan.
    pub fn discover_with_jobs(dir: &Path, runner: &dyn CommandRunner, jobs: usize) -> Self {
        let mut skipped = Vec::new();
        let mut descriptors = Vec::new();

        for path in manifest_paths(dir) {
            match PluginDescriptor::load(&path) {
                Ok(descriptor) => descriptors.push(Arc::new(descriptor)),
                Err(e) => {
                    log::error!("Error loading plugin from file '{}': {}", path.display(), e);
                    skipped.push(SkippedManifest {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let states = probe_all(&descriptors, runner, jobs);

        let mut catalog = Self {
            categories: Vec::new(),
            skipped,
        };
        for (descriptor, activation_state) in descriptors.into_iter().zip(states) {
            catalog.insert(CatalogItem {
                category: descriptor.category.clone(),
                descriptor,
                activation_state,
            });
        }

        log::info!(
            "Loaded {} plugin(s) in {} categories from {}",
            catalog.len(),
            catalog.categories.len(),
            dir.display()
        );
        catalog
    }

    /// Add an item to its category bucket, creating the bucket on first use
    fn insert(&mut self, item: CatalogItem) {
        match self.categories.iter_mut().find(|c| c.name == item.category) {
            Some(category) => category.items.push(item),
            None => self.categories.push(Category {
                name: item.category.clone(),
                items: vec![item],
            }),
        }
    }

    /// Category buckets in creation order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// All items, bucket by bucket
    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.categories.iter().flat_map(|c| c.items.iter())
    }

    /// Find an item by plugin id (first match)
    pub fn find(&self, id: &str) -> Option<&CatalogItem> {
        self.items().find(|item| item.id() == id)
    }

    /// Manifests skipped during this pass
    pub fn skipped(&self) -> &[SkippedManifest] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Manifest candidates directly inside `dir`, sorted by file name
fn manifest_paths(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read plugin directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .filter(|path| !is_filter_file(path))
        .collect();

    paths.sort();
    paths
}

/// Files named `_*` hold exclusion filters, not plugins
fn is_filter_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('_'))
}

/// Probe descriptors in parallel, keeping input order
fn probe_all(
    descriptors: &[Arc<PluginDescriptor>],
    runner: &dyn CommandRunner,
    jobs: usize,
) -> Vec<bool> {
    if jobs <= 1 || descriptors.len() <= 1 {
        return descriptors.iter().map(|d| probe(d, runner)).collect();
    }

    match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => pool.install(|| descriptors.par_iter().map(|d| probe(d, runner)).collect()),
        Err(e) => {
            log::warn!("Failed to create probe thread pool, probing sequentially: {}", e);
            descriptors.iter().map(|d| probe(d, runner)).collect()
        }
    }
}
