// RegSift - app/loader.rs
//
// The only place dataset bytes are read: local files and HTTP fetches.
// Also assembles the dataset registry from config entries, the datasets
// directory, and the optional remote listing.

use crate::core::discovery::{
    discover_datasets, merge_registry, parse_listing, DatasetEntry, DatasetOrigin, DatasetSource,
    DiscoveryConfig,
};
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::platform::http::HttpClient;
use crate::util::error::{DiscoveryError, ReadError};
use std::path::Path;

/// Read the raw text of a dataset. No parsing happens here.
pub fn load_source(source: &DatasetSource, http: &HttpClient) -> Result<String, ReadError> {
    match source {
        DatasetSource::File(path) => {
            let text = fs::read_file_lossy(path).map_err(|e| ReadError::File {
                path: path.clone(),
                source: e,
            })?;
            tracing::debug!(path = %path.display(), bytes = text.len(), "Dataset file read");
            Ok(text)
        }
        DatasetSource::Url(url) => http.get_text(url),
    }
}

/// Resolve a user-supplied dataset argument: a registry name first, then a
/// URL or filesystem path.
pub fn resolve_source(arg: &str, registry: &[DatasetEntry]) -> DatasetSource {
    if let Some(entry) = registry.iter().find(|e| e.name == arg) {
        tracing::debug!(name = arg, source = %entry.source, "Dataset resolved from registry");
        return entry.source.clone();
    }
    DatasetSource::parse(arg)
}

/// Build the dataset registry.
///
/// Never fails as a whole: an unusable datasets directory or listing is
/// reported in the returned warnings and the remaining inputs still count.
/// A missing default directory (`fallback_dir`) is normal and not reported.
pub fn build_registry(
    config: &AppConfig,
    fallback_dir: &Path,
    http: &HttpClient,
) -> (Vec<DatasetEntry>, Vec<String>) {
    let mut warnings = Vec::new();

    let configured: Vec<DatasetEntry> = config
        .dataset_entries
        .iter()
        .map(|entry| DatasetEntry {
            name: entry.name.clone(),
            source: DatasetSource::parse(&entry.source),
            origin: DatasetOrigin::Config,
        })
        .collect();

    let discovery_config = DiscoveryConfig {
        max_depth: config.dataset_max_depth,
        ..Default::default()
    };
    let (dir, explicit) = match config.dataset_dir.as_deref() {
        Some(dir) => (dir, true),
        None => (fallback_dir, false),
    };
    let discovered = match discover_datasets(dir, &discovery_config) {
        Ok((entries, dir_warnings)) => {
            warnings.extend(dir_warnings);
            entries
        }
        Err(DiscoveryError::RootNotFound { .. }) if !explicit => {
            tracing::debug!(dir = %dir.display(), "Default datasets directory absent");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dataset directory scan failed");
            warnings.push(e.to_string());
            Vec::new()
        }
    };

    let listed = match config.listing_url.as_deref() {
        Some(url) => match fetch_listing(url, http) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Dataset listing unavailable");
                warnings.push(e.to_string());
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let registry = merge_registry(configured, discovered, listed);
    tracing::info!(
        datasets = registry.len(),
        warnings = warnings.len(),
        "Dataset registry built"
    );
    (registry, warnings)
}

/// Fetch and decode a remote dataset listing.
pub fn fetch_listing(url: &str, http: &HttpClient) -> Result<Vec<DatasetEntry>, DiscoveryError> {
    let body = http.get_text(url).map_err(|e| DiscoveryError::Listing {
        url: url.to_string(),
        source: e,
    })?;
    parse_listing(url, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::config::DatasetEntryConfig;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_load_file_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, r#"{"company":{"name":"A"}}"#).unwrap();
        let text = load_source(&DatasetSource::File(path), &HttpClient::default()).unwrap();
        assert!(text.contains("\"A\""));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = load_source(
            &DatasetSource::File(PathBuf::from("/nonexistent/regsift/a.json")),
            &HttpClient::default(),
        );
        assert!(matches!(result, Err(ReadError::File { .. })));
    }

    #[test]
    fn test_resolve_prefers_registry_name() {
        let registry = vec![DatasetEntry {
            name: "norr".to_string(),
            source: DatasetSource::Url("https://example.org/norr.jsonl".to_string()),
            origin: DatasetOrigin::Config,
        }];
        assert_eq!(
            resolve_source("norr", &registry),
            DatasetSource::Url("https://example.org/norr.jsonl".to_string())
        );
        assert_eq!(
            resolve_source("local.json", &registry),
            DatasetSource::File(PathBuf::from("local.json"))
        );
    }

    #[test]
    fn test_registry_merges_config_and_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("norr.json"), "[]").unwrap();
        std::fs::write(dir.path().join("syd.jsonl"), "").unwrap();

        let config = AppConfig {
            dataset_entries: vec![DatasetEntryConfig {
                name: "norr".to_string(),
                source: "https://example.org/norr.json".to_string(),
            }],
            ..Default::default()
        };
        let (registry, warnings) = build_registry(&config, dir.path(), &HttpClient::default());
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");

        let summary: Vec<(&str, DatasetOrigin)> =
            registry.iter().map(|e| (e.name.as_str(), e.origin)).collect();
        assert_eq!(
            summary,
            vec![("norr", DatasetOrigin::Config), ("syd", DatasetOrigin::Directory)]
        );
    }

    #[test]
    fn test_explicit_missing_directory_is_warned() {
        let config = AppConfig {
            dataset_dir: Some(PathBuf::from("/nonexistent/regsift/datasets")),
            ..Default::default()
        };
        let (registry, warnings) =
            build_registry(&config, Path::new("/unused"), &HttpClient::default());
        assert!(registry.is_empty());
        assert_eq!(warnings.len(), 1);

        let (_, quiet) = build_registry(
            &AppConfig::default(),
            Path::new("/nonexistent/regsift/default"),
            &HttpClient::default(),
        );
        assert!(quiet.is_empty());
    }
}
