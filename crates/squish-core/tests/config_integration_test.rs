//! Integration tests for configuration loading through to transformation
//!
//! Tests use temporary directories with real `squish.yaml` fixtures to verify:
//! - File loading and defaults
//! - Pattern compilation from YAML
//! - Plugin enable/disable semantics
//! - The transformer honoring the resolved plugin chain

use async_trait::async_trait;
use squish_core::config::CONFIG_FILE;
use squish_core::{
    AssetTransformer, BoxError, Error, OptimizerConfig, ProcessTransform, Transform,
    TransformConfig,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn project(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE), config).unwrap();
    dir
}

/// Records the plugin chain it was called with and drops the last byte
#[derive(Default)]
struct Recording {
    seen: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl Transform for Recording {
    async fn transform(
        &self,
        input: &[u8],
        config: &TransformConfig,
    ) -> Result<Vec<u8>, BoxError> {
        let names = config.plugins().iter().map(|p| p.name.clone()).collect();
        self.seen.lock().unwrap().push(names);
        Ok(input[..input.len().saturating_sub(1)].to_vec())
    }
}

#[tokio::test]
async fn test_config_file_to_transformer() {
    let dir = project(
        r#"
test:
  - "assets/**/*.{png,jpg}"
  - regex: '\.svg$'
max_concurrency: 2
plugins:
  - name: pngquant
    options:
      quality: [0.5, 0.7]
  - name: exec
  - name: exec
    options:
      command: cat
"#,
    );

    let settings = OptimizerConfig::load(dir.path())
        .unwrap()
        .resolve_with(|| 99)
        .unwrap();

    assert_eq!(settings.max_concurrency, 2);
    assert!(settings.matcher.test("assets/a/b.png"));
    assert!(settings.matcher.test("assets/c.jpg"));
    assert!(settings.matcher.test("logo.svg"));
    assert!(!settings.matcher.test("other/b.png"));
    ProcessTransform::validate(&settings.transform).unwrap();

    let recording = Arc::new(Recording::default());
    let transformer = AssetTransformer::new(recording.clone(), settings.transform.clone());
    let out = transformer.transform(vec![1u8, 2, 3]).await.unwrap();

    assert_eq!(out, vec![1, 2]);
    assert_eq!(
        *recording.seen.lock().unwrap(),
        vec![vec!["pngquant".to_string(), "exec".to_string()]]
    );
}

#[test]
fn test_defaults_when_everything_omitted() {
    let dir = project("plugins: []\n");
    let settings = OptimizerConfig::load(dir.path())
        .unwrap()
        .resolve_with(|| 3)
        .unwrap();
    assert_eq!(settings.max_concurrency, 3);
    assert!(settings.matcher.test("any/file.name"));
    assert!(settings.transform.is_empty());
}

#[test]
fn test_configuration_errors_surface_before_any_run() {
    let cases = [
        ("test: [\"*.png\", 1]\n", "InvalidPattern"),
        ("test: { regex: '(' }\n", "InvalidPattern"),
        ("max_concurrency: 0\n", "ConfigInvalid"),
        ("test: [\n", "ConfigParse"),
    ];
    for (yaml, expected) in cases {
        let dir = project(yaml);
        let result = OptimizerConfig::load(dir.path()).and_then(|c| c.resolve_with(|| 1));
        let kind = match result {
            Err(Error::InvalidPattern { .. }) => "InvalidPattern",
            Err(Error::ConfigInvalid { .. }) => "ConfigInvalid",
            Err(Error::ConfigParse(_)) => "ConfigParse",
            Err(other) => panic!("unexpected error for {yaml:?}: {other:?}"),
            Ok(_) => panic!("expected an error for {yaml:?}"),
        };
        assert_eq!(kind, expected, "{yaml}");
    }
}
