//! Folio page file handling

use anyhow::{Context, Result};
use folio_reveal::PageConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up when a directory is given
pub const PAGE_FILE: &str = "folio.toml";

/// Resolve `path` to a page file: either the file itself or `folio.toml`
/// inside the directory
pub fn page_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(PAGE_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Load a page description, falling back to the built-in portfolio page
pub fn load_page(path: Option<&Path>) -> Result<PageConfig> {
    let Some(path) = path else {
        tracing::debug!("no page file given, using the portfolio page");
        return Ok(PageConfig::portfolio());
    };

    let config_path = page_path(path);
    if !config_path.exists() {
        anyhow::bail!(
            "No {} found at {}. Run `folio init` to create one.",
            PAGE_FILE,
            path.display()
        );
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    let config = PageConfig::from_toml(&content)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;

    tracing::info!(path = %config_path.display(), sections = config.sections.len(), "page loaded");
    Ok(config)
}

/// Write the portfolio page to `path`
pub fn write_default(path: &Path, force: bool) -> Result<PathBuf> {
    let config_path = page_path(path);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Pass --force to overwrite it.",
            config_path.display()
        );
    }

    let content = default_toml()?;
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

/// The portfolio page as TOML
pub fn default_toml() -> Result<String> {
    PageConfig::portfolio()
        .to_toml()
        .context("Failed to serialize page config")
}
