//! Error taxonomy for the scraping pipeline
//!
//! Four error families with different blast radii:
//! - [`RegistryError`]: no strategy for a supplier - fatal for the scenario.
//! - [`FetchError`]: transport-level failure - per-item unless it hits the
//!   first category page.
//! - [`ParseError`]: page shape mismatch - always per-item.
//! - [`StoreError`]: persistence read/write failure - per-item / per-file.

use std::path::PathBuf;
use thiserror::Error;

/// Transport-level failure while fetching a page.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("HTTP error {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    #[error("cannot build request from '{input}': {reason}")]
    InvalidRequest { input: String, reason: String },
}

impl FetchError {
    pub fn http_status(status: u16, url: &str) -> Self {
        Self::HttpStatus {
            status,
            url: url.to_string(),
        }
    }

    pub fn network(url: &str, message: &str) -> Self {
        Self::Network {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    pub fn invalid_request(input: &str, reason: &str) -> Self {
        Self::InvalidRequest {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the fetch collaborator may retry this failure on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpStatus { status, .. } => {
                matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            Self::Network { .. } => true,
            Self::EmptyBody { .. } => true,
            Self::InvalidRequest { .. } => false,
        }
    }
}

/// Page structure did not match what the strategy expected.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("required field '{field}' not found in page")]
    RequiredFieldMissing {
        field: String,
        context: Option<String>,
    },

    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("URL resolution failed for '{href}': {reason}")]
    UrlResolution {
        href: String,
        reason: String,
        base_url: Option<String>,
    },

    #[error("record validation failed: {reason}")]
    RecordValidation {
        reason: String,
        field_errors: Vec<String>,
    },

    #[error("structured data missing or malformed at {url}: {reason}")]
    StructuredData { url: String, reason: String },
}

impl ParseError {
    pub fn required_field_missing(field: &str, context: Option<&str>) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            context: context.map(|s| s.to_string()),
        }
    }

    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn url_resolution(href: &str, reason: &str, base_url: Option<&str>) -> Self {
        Self::UrlResolution {
            href: href.to_string(),
            reason: reason.to_string(),
            base_url: base_url.map(|s| s.to_string()),
        }
    }

    pub fn structured_data(url: &str, reason: &str) -> Self {
        Self::StructuredData {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Supplier dispatch failure. Fatal for the scenario that raised it.
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    #[error("no strategy registered for supplier '{supplier}'")]
    UnsupportedSupplier { supplier: String },

    #[error("cannot derive supplier identity from '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl RegistryError {
    pub fn unsupported(supplier: &str) -> Self {
        Self::UnsupportedSupplier {
            supplier: supplier.to_string(),
        }
    }

    pub fn invalid_url(url: &str, reason: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Persistence failure while writing or reading a record file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Malformed {
            path: path.into(),
            source,
        }
    }

    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. } | Self::Malformed { path, .. } => path,
        }
    }
}

/// Per-item failure raised by a strategy while fetching one product page.
#[derive(Error, Debug, Clone)]
pub enum StrategyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type FetchResult<T> = Result<T, FetchError>;
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(FetchError::http_status(503, "https://x.example").is_transient());
        assert!(FetchError::network("https://x.example", "timed out").is_transient());
        assert!(!FetchError::http_status(404, "https://x.example").is_transient());
        assert!(!FetchError::invalid_request("chairs", "no search template").is_transient());
    }

    #[test]
    fn strategy_error_wraps_both_families() {
        let fetch: StrategyError = FetchError::http_status(404, "https://x.example").into();
        assert!(matches!(fetch, StrategyError::Fetch(_)));

        let parse: StrategyError = ParseError::required_field_missing("title", None).into();
        assert!(matches!(parse, StrategyError::Parse(_)));
    }
}
