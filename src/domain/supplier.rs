//! Supplier identity value object
//!
//! A supplier is identified by the registrable host of its site, lowercased
//! and with any leading `www.` removed. The same identity is used as the
//! dispatch key in the strategy registry and as the grouping key during
//! aggregation, so derivation must be stable for every URL of one site.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::domain::errors::RegistryError;

/// Normalized domain of a supplier site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierIdentity(String);

impl SupplierIdentity {
    /// Derive the identity from any absolute URL belonging to the supplier.
    pub fn from_url(url: &str) -> Result<Self, RegistryError> {
        let parsed =
            Url::parse(url).map_err(|e| RegistryError::invalid_url(url, &e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| RegistryError::invalid_url(url, "URL has no host"))?;

        Ok(Self::from_host(host))
    }

    /// Normalize a bare host name into an identity.
    pub fn from_host(host: &str) -> Self {
        let lowered = host.to_ascii_lowercase();
        let stripped = lowered.strip_prefix("www.").unwrap_or(&lowered);

        // A trailing dot is valid DNS but never what a config file means.
        Self(stripped.trim_end_matches('.').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SupplierIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
