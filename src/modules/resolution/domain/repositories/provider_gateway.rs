use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[cfg(test)]
use mockall::automock;

use crate::shared::{
    domain::value_objects::{ContentKind, ProviderName},
    errors::AppResult,
};

/// How a matched episode/chapter is addressed by its provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnitLocator {
    /// Proxy-relative path (e.g. `/watch/10`)
    Path(String),
    /// Opaque id used with the kind's watch/read endpoint
    Id(String),
}

impl fmt::Display for UnitLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitLocator::Path(path) => write!(f, "path {}", path),
            UnitLocator::Id(id) => write!(f, "id {}", id),
        }
    }
}

/// One call of the search → info → extract chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
    Search { query: String },
    Info { locator: String },
    Extract { unit: UnitLocator },
}

impl ProviderRequest {
    pub fn is_search(&self) -> bool {
        matches!(self, ProviderRequest::Search { .. })
    }
}

/// Gateway to the scraping providers.
///
/// Responses are returned loosely typed: provider schemas differ and change
/// without notice, so fields are validated one by one by the caller.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContentProviderGateway: Send + Sync {
    /// Absolute locator a request will hit, recorded in traces
    fn locate(&self, provider: &ProviderName, kind: ContentKind, request: &ProviderRequest)
        -> String;

    /// Perform the request and return the decoded JSON body
    async fn fetch(
        &self,
        provider: &ProviderName,
        kind: ContentKind,
        request: &ProviderRequest,
    ) -> AppResult<Value>;
}
