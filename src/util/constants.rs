// RegSift - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Anything that bounds memory, I/O, or user-configurable ranges lives here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "RegSift";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "RegSift";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Ingestion
// =============================================================================

/// Byte-order mark some exporters prepend to UTF-8 JSON files.
pub const UTF8_BOM: char = '\u{feff}';

/// Maximum length of a raw line included in debug output.
/// Prevents accidental exposure of full records (phone numbers, addresses)
/// in logs.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 120;

// =============================================================================
// Display
// =============================================================================

/// Number of visible records rendered by the front end before the list is
/// truncated with a notice. The core always returns the full ordered set.
pub const DEFAULT_MAX_RENDERED: usize = 500;

/// Minimum user-configurable render cap.
pub const MIN_MAX_RENDERED: usize = 1;

/// Hard upper bound on the render cap.
pub const ABSOLUTE_MAX_RENDERED: usize = 10_000;

/// Default sort applied when nothing else is configured.
pub const DEFAULT_SORT: &str = "name-asc";

/// Accepted record layouts for the front end.
pub const VIEW_MODES: &[&str] = &["grid", "list"];

/// Accepted interface locales.
pub const LOCALES: &[&str] = &["ru", "sv"];

/// Accepted `[logging] level` values.
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Export limits
// =============================================================================

/// Maximum number of records written by a single CSV or JSON export.
pub const MAX_EXPORT_RECORDS: usize = 1_000_000;

/// Separator used when flattening category lists into a single CSV cell.
pub const EXPORT_LIST_SEPARATOR: &str = "; ";

// =============================================================================
// Dataset registry
// =============================================================================

/// Default maximum directory recursion depth when discovering datasets.
pub const DEFAULT_DATASET_MAX_DEPTH: usize = 3;

/// Hard upper bound on dataset discovery depth.
pub const ABSOLUTE_MAX_DATASET_DEPTH: usize = 20;

/// Maximum number of dataset files returned by one discovery walk.
pub const MAX_DISCOVERED_DATASETS: usize = 1_000;

/// Default include glob patterns for dataset discovery.
pub const DEFAULT_DATASET_PATTERNS: &[&str] = &["*.json", "*.jsonl", "*.ndjson", "*.txt"];

/// Default exclude glob patterns for dataset discovery.
/// Literal names (no wildcards) also prune directory descent.
pub const DEFAULT_DATASET_EXCLUDES: &[&str] = &["*.tmp", ".git", "node_modules"];

/// Datasets subdirectory name inside the platform data directory.
pub const DATASETS_DIR_NAME: &str = "datasets";

// =============================================================================
// Network
// =============================================================================

/// Default timeout for fetching a remote dataset or listing (seconds).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Minimum user-configurable HTTP timeout (seconds).
pub const MIN_HTTP_TIMEOUT_SECS: u64 = 1;

/// Maximum user-configurable HTTP timeout (seconds).
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Persistence
// =============================================================================

/// Key under which the full annotation mapping is persisted.
pub const ANNOTATIONS_KEY: &str = "company_interactions";

/// Key under which view-mode and locale preferences are persisted.
pub const PREFERENCES_KEY: &str = "preferences";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when not overridden by RUST_LOG, --debug, or config.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// File names
// =============================================================================

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Extension given to every key-value store file.
pub const STORE_FILE_EXTENSION: &str = "json";
