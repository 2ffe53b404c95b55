//! Transform plugin configuration and the external transform contract
//!
//! A transform turns an asset's bytes into (hopefully) fewer bytes. Squish
//! does not know how; it hands the bytes and the ordered plugin list to a
//! [`Transform`] implementation and judges the result by size alone.
//!
//! # Example
//!
//! ```yaml
//! plugins:
//!   - name: pngquant
//!     options:
//!       quality: [0.65, 0.8]
//!       speed: 4
//!
//!   # no options: listed but disabled
//!   - name: exec
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Error type produced by external transforms
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Plugin entry as written in the configuration file
///
/// Omitting `options` (or setting it to `null`) disables the plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Plugin name
    pub name: String,

    /// Plugin options; `None` disables the plugin
    #[serde(default)]
    pub options: Option<Value>,
}

impl PluginEntry {
    /// Create an enabled entry
    pub fn new(name: impl Into<String>, options: Value) -> Self {
        Self {
            name: name.into(),
            options: Some(options),
        }
    }

    /// Create a disabled entry
    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: None,
        }
    }
}

/// An enabled plugin with its options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Plugin name
    pub name: String,

    /// Plugin options, passed through untouched
    pub options: Value,
}

/// Ordered list of enabled plugins handed to the external transform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformConfig {
    plugins: Vec<PluginConfig>,
}

impl TransformConfig {
    /// Build from configuration entries, dropping disabled ones and keeping
    /// the order of the rest.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a PluginEntry>) -> Self {
        let plugins = entries
            .into_iter()
            .filter_map(|entry| {
                entry.options.as_ref().map(|options| PluginConfig {
                    name: entry.name.clone(),
                    options: options.clone(),
                })
            })
            .collect();
        Self { plugins }
    }

    /// Enabled plugins in order
    pub fn plugins(&self) -> &[PluginConfig] {
        &self.plugins
    }

    /// Whether no plugin is enabled
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// External size-reducing transform
///
/// Implementations must be safe to call concurrently for independent inputs.
/// Errors are reported as-is; the caller decides what a failure means.
#[async_trait]
pub trait Transform: Send + Sync {
    /// Transform `input` using the given plugin chain
    async fn transform(
        &self,
        input: &[u8],
        config: &TransformConfig,
    ) -> std::result::Result<Vec<u8>, BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plugin_entries() {
        let yaml = r#"
- name: pngquant
  options:
    quality: [0.65, 0.8]
- name: exec
- name: optipng
  options: ~
- name: svgo
  options: {}
"#;
        let entries: Vec<PluginEntry> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries[0].options.is_some());
        assert!(entries[1].options.is_none());
        assert!(entries[2].options.is_none());
        assert!(entries[3].options.is_some());
    }

    #[test]
    fn test_disabled_plugins_are_dropped_in_order() {
        let entries = vec![
            PluginEntry::new("b", Value::Null),
            PluginEntry::disabled("skip"),
            PluginEntry::new("a", Value::Bool(true)),
        ];
        let config = TransformConfig::from_entries(&entries);
        let names: Vec<&str> = config.plugins().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_all_disabled_is_empty() {
        let entries = vec![PluginEntry::disabled("pngquant")];
        assert!(TransformConfig::from_entries(&entries).is_empty());
    }
}
