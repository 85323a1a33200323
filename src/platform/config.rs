// RegSift - platform/config.rs
//
// Platform data directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for RegSift data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Directory holding config.toml (e.g. ~/.config/regsift/).
    pub config_dir: PathBuf,

    /// Directory holding the key-value store files (annotations, preferences).
    pub data_dir: PathBuf,

    /// Default datasets directory scanned when config names none.
    pub datasets_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();
            let datasets_dir = data_dir.join(constants::DATASETS_DIR_NAME);

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                datasets = %datasets_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
                datasets_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self::rooted_at(PathBuf::from("."))
        }
    }

    /// Put config, store and datasets under a single directory (`--data-dir`).
    pub fn rooted_at(dir: PathBuf) -> Self {
        Self {
            config_dir: dir.clone(),
            datasets_dir: dir.join(constants::DATASETS_DIR_NAME),
            data_dir: dir,
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are ignored so a newer config file works with an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub datasets: DatasetsSection,
    pub display: DisplaySection,
    pub http: HttpSection,
    pub logging: LoggingSection,
}

/// `[datasets]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DatasetsSection {
    /// Directory scanned for dataset files.
    pub directory: Option<PathBuf>,
    /// URL of a JSON listing of `{ name, source }` objects.
    pub listing_url: Option<String>,
    /// Maximum recursion depth under `directory`.
    pub max_depth: Option<usize>,
    /// `[[datasets.entries]]` tables.
    pub entries: Vec<DatasetEntryConfig>,
}

/// One `[[datasets.entries]]` table: a name plus a path or URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct DatasetEntryConfig {
    pub name: String,
    pub source: String,
}

/// `[display]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Records rendered before the list is truncated.
    pub max_rendered: Option<usize>,
    /// "grid" or "list".
    pub view_mode: Option<String>,
}

/// `[http]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub timeout_secs: Option<u64>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Datasets --
    pub dataset_dir: Option<PathBuf>,
    pub listing_url: Option<String>,
    pub dataset_max_depth: usize,
    pub dataset_entries: Vec<DatasetEntryConfig>,

    // -- Display --
    pub max_rendered: usize,
    /// Initial view mode when no preference has been saved yet.
    pub view_mode: Option<String>,

    // -- HTTP --
    pub http_timeout_secs: u64,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_dir: None,
            listing_url: None,
            dataset_max_depth: constants::DEFAULT_DATASET_MAX_DEPTH,
            dataset_entries: Vec::new(),
            max_rendered: constants::DEFAULT_MAX_RENDERED,
            view_mode: None,
            http_timeout_secs: constants::DEFAULT_HTTP_TIMEOUT_SECS,
            log_level: None,
        }
    }
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> ConfigError {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Load and validate `config.toml` from `config_dir`.
///
/// Returns the validated config plus every non-fatal problem found. A missing
/// file is the first-run case: defaults, no warnings. An unreadable or
/// unparseable file yields defaults and a single error.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<ConfigError>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            return (
                AppConfig::default(),
                vec![ConfigError::Io {
                    path: config_path,
                    source: e,
                }],
            )
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            return (
                AppConfig::default(),
                vec![ConfigError::TomlParse {
                    path: config_path,
                    source: e,
                }],
            )
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let (config, warnings) = validate(raw);
    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }
    (config, warnings)
}

/// Validate every raw value against its named bounds, accumulating all errors.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<ConfigError>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    // -- Datasets --
    if let Some(dir) = raw.datasets.directory {
        if dir.as_os_str().is_empty() {
            warnings.push(out_of_range(
                "datasets.directory",
                "",
                "a non-empty path".to_string(),
            ));
        } else {
            config.dataset_dir = Some(dir);
        }
    }

    if let Some(url) = raw.datasets.listing_url {
        let lower = url.trim().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            config.listing_url = Some(url.trim().to_string());
        } else {
            warnings.push(out_of_range(
                "datasets.listing_url",
                &url,
                "an http:// or https:// URL".to_string(),
            ));
        }
    }

    if let Some(depth) = raw.datasets.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DATASET_DEPTH).contains(&depth) {
            config.dataset_max_depth = depth;
        } else {
            warnings.push(out_of_range(
                "datasets.max_depth",
                depth,
                format!(
                    "1-{} (default {})",
                    constants::ABSOLUTE_MAX_DATASET_DEPTH,
                    constants::DEFAULT_DATASET_MAX_DEPTH
                ),
            ));
        }
    }

    for entry in raw.datasets.entries {
        if entry.name.trim().is_empty() || entry.source.trim().is_empty() {
            warnings.push(out_of_range(
                "datasets.entries",
                format!("name = \"{}\", source = \"{}\"", entry.name, entry.source),
                "a non-empty name and source".to_string(),
            ));
            continue;
        }
        config.dataset_entries.push(DatasetEntryConfig {
            name: entry.name.trim().to_string(),
            source: entry.source.trim().to_string(),
        });
    }

    // -- Display --
    if let Some(max) = raw.display.max_rendered {
        if (constants::MIN_MAX_RENDERED..=constants::ABSOLUTE_MAX_RENDERED).contains(&max) {
            config.max_rendered = max;
        } else {
            warnings.push(out_of_range(
                "display.max_rendered",
                max,
                format!(
                    "{}-{} (default {})",
                    constants::MIN_MAX_RENDERED,
                    constants::ABSOLUTE_MAX_RENDERED,
                    constants::DEFAULT_MAX_RENDERED
                ),
            ));
        }
    }

    if let Some(mode) = raw.display.view_mode {
        let mode = mode.trim().to_lowercase();
        if constants::VIEW_MODES.contains(&mode.as_str()) {
            config.view_mode = Some(mode);
        } else {
            warnings.push(out_of_range(
                "display.view_mode",
                mode,
                constants::VIEW_MODES.join(" or "),
            ));
        }
    }

    // -- HTTP --
    if let Some(secs) = raw.http.timeout_secs {
        if (constants::MIN_HTTP_TIMEOUT_SECS..=constants::MAX_HTTP_TIMEOUT_SECS).contains(&secs) {
            config.http_timeout_secs = secs;
        } else {
            warnings.push(out_of_range(
                "http.timeout_secs",
                secs,
                format!(
                    "{}-{} (default {})",
                    constants::MIN_HTTP_TIMEOUT_SECS,
                    constants::MAX_HTTP_TIMEOUT_SECS,
                    constants::DEFAULT_HTTP_TIMEOUT_SECS
                ),
            ));
        }
    }

    // -- Logging --
    if let Some(level) = raw.logging.level {
        let level = level.trim().to_lowercase();
        if constants::LOG_LEVELS.contains(&level.as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(out_of_range(
                "logging.level",
                level,
                constants::LOG_LEVELS.join(", "),
            ));
        }
    }

    (config, warnings)
}
