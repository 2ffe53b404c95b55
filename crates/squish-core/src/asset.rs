//! In-memory build assets
//!
//! The build host owns the asset set for the duration of an emit phase. Squish
//! only reads asset contents and swaps entries for [`RawAsset`]s when an
//! optimization pays off; it never adds or removes names.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Mapping from asset name to asset, as handed over by the build host
pub type AssetMap = BTreeMap<String, Arc<dyn Asset>>;

/// Contents of an asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Binary contents
    Buffer(Vec<u8>),
    /// Textual contents, treated as UTF-8 bytes
    Text(String),
}

impl Source {
    /// Length in bytes
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the contents are empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the contents as bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Buffer(bytes) => bytes,
            Self::Text(text) => text.as_bytes(),
        }
    }

    /// Take the contents as a byte buffer
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Buffer(bytes) => bytes,
            Self::Text(text) => text.into_bytes(),
        }
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffer(bytes)
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Self::Buffer(bytes.to_vec())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A named build output with readable contents
pub trait Asset: Send + Sync + fmt::Debug {
    /// Current contents
    fn source(&self) -> Source;

    /// Size in bytes
    fn size(&self) -> usize {
        self.source().len()
    }
}

/// Asset backed by an owned buffer
///
/// This is what the optimizer writes back in place of an asset it shrank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset {
    source: Source,
}

impl RawAsset {
    /// Create a raw asset from any contents
    pub fn new(source: impl Into<Source>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Wrap the asset for insertion into an [`AssetMap`]
    pub fn shared(source: impl Into<Source>) -> Arc<dyn Asset> {
        Arc::new(Self::new(source))
    }
}

impl Asset for RawAsset {
    fn source(&self) -> Source {
        self.source.clone()
    }

    fn size(&self) -> usize {
        self.source.len()
    }
}
