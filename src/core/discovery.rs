// RegSift - core/discovery.rs
//
// Dataset registry: named dataset sources from config entries, a datasets
// directory, and an optional remote listing.
//
// Directory traversal uses `walkdir` and reads only directory entries, never
// file contents; reading a dataset is owned by app::loader. Per-entry I/O
// errors are non-fatal and collected as warnings.

use crate::util::constants;
use crate::util::error::DiscoveryError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// =============================================================================
// Types
// =============================================================================

/// Where a dataset's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// Interpret a user- or config-supplied string: `http://` and `https://`
    /// prefixes are URLs, anything else is a filesystem path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DatasetSource::Url(raw.to_string())
        } else {
            DatasetSource::File(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::File(path) => write!(f, "{}", path.display()),
            DatasetSource::Url(url) => f.write_str(url),
        }
    }
}

/// Which registry input a dataset entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetOrigin {
    Config,
    Directory,
    Listing,
}

impl DatasetOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            DatasetOrigin::Config => "config",
            DatasetOrigin::Directory => "directory",
            DatasetOrigin::Listing => "listing",
        }
    }
}

/// A named, loadable dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    pub name: String,
    pub source: DatasetSource,
    pub origin: DatasetOrigin,
}

/// One element of a remote listing document.
#[derive(Debug, Deserialize)]
struct ListingItem {
    name: String,
    source: String,
}

// =============================================================================
// Configuration
// =============================================================================

/// Limits and patterns for a directory scan.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Maximum number of datasets to return before stopping.
    pub max_datasets: usize,

    /// Filename globs a file must match. Empty means "everything not excluded".
    pub include_patterns: Vec<String>,

    /// Globs matched against filenames; literal patterns also prune directories.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_DATASET_MAX_DEPTH,
            max_datasets: constants::MAX_DISCOVERED_DATASETS,
            include_patterns: constants::DEFAULT_DATASET_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_patterns: constants::DEFAULT_DATASET_EXCLUDES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

// =============================================================================
// Directory discovery
// =============================================================================

/// Discover dataset files under `root`.
///
/// Each file becomes an entry named by its path relative to `root`, without
/// extension and with `/` separators (`regions/norr`). Results are sorted by
/// name.
///
/// Returns `Err` only when `root` itself is unusable; everything else ends
/// up in the warnings vector.
pub fn discover_datasets(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<DatasetEntry>, Vec<String>), DiscoveryError> {
    // fs::metadata rather than Path::is_dir so PermissionDenied stays
    // distinguishable from NotFound.
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
    }

    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DATASET_DEPTH);
    let max_datasets = config.max_datasets.min(constants::MAX_DISCOVERED_DATASETS);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        max_datasets,
        include = ?config.include_patterns,
        exclude = ?config.exclude_patterns,
        "Dataset discovery starting"
    );

    let include_pats = compile_patterns(&config.include_patterns, "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    let mut entries: Vec<DatasetEntry> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.file_type().is_dir() && e.depth() > 0 {
                let name = e.file_name().to_str().unwrap_or("");
                return !is_excluded_component(name, &exclude_pats);
            }
            true
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                continue;
            }
        };

        if exclude_pats.iter().any(|p| p.matches(file_name)) {
            tracing::trace!(file = file_name, "Excluded by pattern");
            continue;
        }
        if !is_included(file_name, &include_pats) {
            tracing::trace!(file = file_name, "Not matched by include patterns");
            continue;
        }

        if entries.len() >= max_datasets {
            warnings.push(format!(
                "More than {max_datasets} dataset files found under '{}'; the rest were skipped",
                root.display()
            ));
            tracing::info!(limit = max_datasets, "Dataset discovery limit reached");
            break;
        }

        entries.push(DatasetEntry {
            name: dataset_name(root, path),
            source: DatasetSource::File(path.to_path_buf()),
            origin: DatasetOrigin::Directory,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(
        datasets = entries.len(),
        warnings = warnings.len(),
        "Dataset discovery complete"
    );

    Ok((entries, warnings))
}

/// Relative path without extension, `/`-separated.
fn dataset_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// =============================================================================
// Remote listing
// =============================================================================

/// Decode a remote listing body: a JSON array of `{ "name", "source" }`.
///
/// Items with a blank name or source are skipped.
pub fn parse_listing(url: &str, body: &str) -> Result<Vec<DatasetEntry>, DiscoveryError> {
    let items: Vec<ListingItem> =
        serde_json::from_str(body.trim_start_matches(constants::UTF8_BOM)).map_err(|e| {
            DiscoveryError::ListingDecode {
                url: url.to_string(),
                source: e,
            }
        })?;

    let total = items.len();
    let entries: Vec<DatasetEntry> = items
        .into_iter()
        .filter(|item| !item.name.trim().is_empty() && !item.source.trim().is_empty())
        .map(|item| DatasetEntry {
            name: item.name.trim().to_string(),
            source: DatasetSource::parse(&item.source),
            origin: DatasetOrigin::Listing,
        })
        .collect();

    if entries.len() < total {
        tracing::warn!(
            url,
            skipped = total - entries.len(),
            "Dataset listing items with blank name or source skipped"
        );
    }

    Ok(entries)
}

// =============================================================================
// Registry merge
// =============================================================================

/// Merge registry inputs in priority order: config, then directory, then
/// listing. The first entry seen under a name wins.
pub fn merge_registry(
    configured: Vec<DatasetEntry>,
    discovered: Vec<DatasetEntry>,
    listed: Vec<DatasetEntry>,
) -> Vec<DatasetEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for entry in configured.into_iter().chain(discovered).chain(listed) {
        if seen.insert(entry.name.clone()) {
            merged.push(entry);
        } else {
            tracing::debug!(
                name = %entry.name,
                origin = entry.origin.label(),
                "Dataset name already registered, shadowed entry dropped"
            );
        }
    }

    merged
}

// =============================================================================
// Glob helpers
// =============================================================================

fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Literal exclude patterns (no wildcards) also match directory names.
fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}

fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    include_pats.is_empty() || include_pats.iter().any(|p| p.matches(file_name))
}
