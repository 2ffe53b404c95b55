//! Write a starter configuration

use anyhow::Result;
use squish_core::config::CONFIG_FILE;
use std::fs;
use std::path::Path;

const TEMPLATE: &str = r#"# Squish configuration

# Which assets to optimize. Strings are globs; use `regex:` for regexes.
# Omit to optimize every asset.
test:
  - "**/*.png"

# Maximum number of optimizer processes at once.
# Omit to use one per logical core.
# max_concurrency: 4

# Plugins run in order. A plugin without options is disabled.
plugins:
  - name: pngquant
    options:
      quality: [0.65, 0.8]
      speed: 4
      strip: true

  # Any stdin-to-stdout optimizer:
  # - name: exec
  #   options:
  #     command: svgo
  #     args: ["-i", "-", "-o", "-"]
"#;

/// Run the init command
pub async fn run(path: &str) -> Result<()> {
    let dir = Path::new(path);

    // Create directory if it doesn't exist
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!(
            "Directory '{}' already contains a {}",
            dir.display(),
            CONFIG_FILE
        );
    }

    fs::write(&config_path, TEMPLATE)?;
    tracing::info!("Created {}", config_path.display());
    Ok(())
}
