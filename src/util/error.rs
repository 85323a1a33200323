// RegSift - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation across module boundaries.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all RegSift operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum RegSiftError {
    /// Ingestion produced no valid records.
    Ingest(IngestError),

    /// The dataset payload itself could not be read.
    Read(ReadError),

    /// Persisted annotations or preferences could not be read or written.
    Persistence(PersistenceError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Dataset discovery failed.
    Discovery(DiscoveryError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for RegSiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingest(e) => write!(f, "Format error: {e}"),
            Self::Read(e) => write!(f, "Read error: {e}"),
            Self::Persistence(e) => write!(f, "Persistence error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for RegSiftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ingest(e) => Some(e),
            Self::Read(e) => Some(e),
            Self::Persistence(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Ingestion errors
// ---------------------------------------------------------------------------

/// Errors raised when a payload yields no usable records.
///
/// Individual malformed lines are never errors; they are only counted.
#[derive(Debug)]
pub enum IngestError {
    /// Neither decode path produced a single valid record.
    Format {
        /// Label of the decode path that ran last ("whole-document" or
        /// "line-delimited").
        mode: &'static str,
        /// Elements or lines that decoded but were not valid records.
        dropped_invalid: usize,
        /// Lines that failed to decode at all (line mode only).
        malformed_lines: usize,
    },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format {
                mode,
                dropped_invalid,
                malformed_lines,
            } => write!(
                f,
                "no valid company records found ({mode} decode, \
                 {dropped_invalid} invalid, {malformed_lines} malformed)"
            ),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<IngestError> for RegSiftError {
    fn from(e: IngestError) -> Self {
        Self::Ingest(e)
    }
}

// ---------------------------------------------------------------------------
// Read errors
// ---------------------------------------------------------------------------

/// Errors reading a dataset payload from disk or the network.
#[derive(Debug)]
pub enum ReadError {
    /// Local file could not be read.
    File { path: PathBuf, source: io::Error },

    /// The HTTP request could not be completed (DNS, connect, TLS, timeout).
    Http {
        url: String,
        source: Box<ureq::Error>,
    },

    /// The server answered with a non-success status.
    Status {
        url: String,
        status: u16,
        status_text: String,
    },

    /// The response body could not be read as text.
    Body { url: String, source: io::Error },
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path, source } => {
                write!(f, "cannot read '{}': {source}", path.display())
            }
            Self::Http { url, source } => write!(f, "request to '{url}' failed: {source}"),
            Self::Status {
                url,
                status,
                status_text,
            } => write!(f, "fetch of '{url}' failed: {status} {status_text}"),
            Self::Body { url, source } => {
                write!(f, "cannot read response body from '{url}': {source}")
            }
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File { source, .. } => Some(source),
            Self::Http { source, .. } => Some(source.as_ref()),
            Self::Body { source, .. } => Some(source),
            Self::Status { .. } => None,
        }
    }
}

impl From<ReadError> for RegSiftError {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

/// Errors reading or writing the local key-value store.
#[derive(Debug)]
pub enum PersistenceError {
    /// The stored value exists but could not be read.
    Read { key: String, source: io::Error },

    /// The value could not be written back.
    Write { key: String, source: io::Error },

    /// The in-memory value could not be serialised.
    Encode {
        key: String,
        source: serde_json::Error,
    },

    /// The stored value is not valid JSON of the expected shape.
    Decode {
        key: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { key, source } => write!(f, "cannot read stored '{key}': {source}"),
            Self::Write { key, source } => write!(f, "cannot write stored '{key}': {source}"),
            Self::Encode { key, source } => write!(f, "cannot serialise '{key}': {source}"),
            Self::Decode { key, source } => write!(f, "stored '{key}' is malformed: {source}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Encode { source, .. } | Self::Decode { source, .. } => Some(source),
        }
    }
}

impl From<PersistenceError> for RegSiftError {
    fn from(e: PersistenceError) -> Self {
        Self::Persistence(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Export would exceed maximum record count.
    TooManyRecords { count: usize, max: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::TooManyRecords { count, max } => write!(
                f,
                "Export of {count} records exceeds maximum of {max}. \
                 Apply filters to reduce the result set."
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::TooManyRecords { .. } => None,
        }
    }
}

impl From<ExportError> for RegSiftError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for RegSiftError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to building the dataset registry.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The datasets directory does not exist.
    RootNotFound { path: PathBuf },

    /// The datasets path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the datasets directory.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// The remote listing could not be fetched.
    Listing { url: String, source: ReadError },

    /// The remote listing is not a JSON array of `{ name, source }` objects.
    ListingDecode {
        url: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Datasets path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Datasets path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => write!(
                f,
                "Permission denied accessing '{}': {source}",
                path.display()
            ),
            Self::Listing { url, source } => {
                write!(f, "Cannot fetch dataset listing '{url}': {source}")
            }
            Self::ListingDecode { url, source } => {
                write!(f, "Dataset listing '{url}' is malformed: {source}")
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::Listing { source, .. } => Some(source),
            Self::ListingDecode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for RegSiftError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

/// Convenience type alias for RegSift results.
pub type Result<T> = std::result::Result<T, RegSiftError>;
