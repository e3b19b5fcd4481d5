// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `ipfs://<hash>` content locators.

use serde::{Deserialize, Serialize};

use super::PinError;

pub const IPFS_SCHEME: &str = "ipfs://";

/// Reference to pinned content by its content hash.
///
/// Always `ipfs://` followed by a non-empty hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentLocator(String);

impl ContentLocator {
    /// Build a locator from a hash returned by the pinning service.
    pub fn from_hash(hash: impl AsRef<str>) -> Result<Self, PinError> {
        let hash = hash.as_ref().trim();
        if hash.is_empty() {
            return Err(PinError::InvalidResponse(
                "pinning service returned an empty content hash".to_string(),
            ));
        }
        if hash.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(PinError::InvalidResponse(format!(
                "pinning service returned a malformed content hash: {hash}"
            )));
        }
        Ok(Self(format!("{IPFS_SCHEME}{hash}")))
    }

    /// Parse an existing `ipfs://` locator.
    pub fn parse(locator: &str) -> Option<Self> {
        let hash = locator.strip_prefix(IPFS_SCHEME)?;
        Self::from_hash(hash).ok()
    }

    pub fn hash(&self) -> &str {
        &self.0[IPFS_SCHEME.len()..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ContentLocator> for String {
    fn from(value: ContentLocator) -> Self {
        value.0
    }
}

impl TryFrom<String> for ContentLocator {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("not an ipfs:// locator: {value}"))
    }
}
