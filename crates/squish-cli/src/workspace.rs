//! Directory-backed asset sets
//!
//! Files under a build output directory become assets named by their
//! `/`-separated path relative to that directory.

use anyhow::{Context, Result};
use squish_core::{Asset, AssetMap, RawAsset};
use squish_runtime::{AssetState, RunReport};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read every regular file under `root` into an asset set
pub fn load_assets(root: &Path) -> Result<AssetMap> {
    if !root.is_dir() {
        anyhow::bail!("'{}' is not a directory", root.display());
    }

    let mut assets = AssetMap::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root)?;
        let Some(name) = asset_name(relative) else {
            tracing::warn!("Skipping non UTF-8 path {}", entry.path().display());
            continue;
        };

        let bytes = std::fs::read(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        assets.insert(name, RawAsset::shared(bytes));
    }
    Ok(assets)
}

/// Write back the assets the run committed. Returns how many were written.
pub fn write_committed(root: &Path, assets: &AssetMap, report: &RunReport) -> Result<usize> {
    let mut written = 0;
    for (name, state) in &report.assets {
        if *state != AssetState::Committed {
            continue;
        }
        let Some(asset) = assets.get(name) else {
            continue;
        };
        let path = asset_path(root, name);
        std::fs::write(&path, asset.source().as_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Wrote {} ({} bytes)", path.display(), asset.size());
        written += 1;
    }
    Ok(written)
}

fn asset_name(relative: &Path) -> Option<String> {
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

fn asset_path(root: &Path, name: &str) -> PathBuf {
    name.split('/').fold(root.to_path_buf(), |path, part| path.join(part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use squish_core::Source;

    #[test]
    fn test_load_assets_uses_relative_slash_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("img/icons")).unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        std::fs::write(dir.path().join("img/icons/a.png"), [1u8, 2, 3]).unwrap();

        let assets = load_assets(dir.path()).unwrap();
        let names: Vec<&str> = assets.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["app.js", "img/icons/a.png"]);
        assert_eq!(
            assets["img/icons/a.png"].source(),
            Source::Buffer(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_load_assets_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("x");
        std::fs::write(&file, "x").unwrap();
        assert!(load_assets(&file).is_err());
    }

    #[test]
    fn test_write_committed_only_touches_committed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("img")).unwrap();
        std::fs::write(dir.path().join("img/a.png"), [9u8; 10]).unwrap();
        std::fs::write(dir.path().join("b.png"), [9u8; 10]).unwrap();

        let mut assets = AssetMap::new();
        assets.insert("img/a.png".to_string(), RawAsset::shared(vec![1u8; 3]));
        assets.insert("b.png".to_string(), RawAsset::shared(vec![1u8; 3]));

        let mut report = RunReport::default();
        report
            .assets
            .insert("img/a.png".to_string(), AssetState::Committed);
        report
            .assets
            .insert("b.png".to_string(), AssetState::Unchanged);

        let written = write_committed(dir.path(), &assets, &report).unwrap();
        assert_eq!(written, 1);
        assert_eq!(std::fs::read(dir.path().join("img/a.png")).unwrap(), vec![1u8; 3]);
        assert_eq!(std::fs::read(dir.path().join("b.png")).unwrap(), vec![9u8; 10]);
    }
}
