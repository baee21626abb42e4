// Purpose: Assemble resolver configuration from defaults, an optional glean.toml, and environment.
// Inputs/Outputs: Root directory (+ env lookup) in, Config with absolute search/base roots out.
// Invariants: Environment overrides file values, file overrides defaults; relative paths anchor at the root dir.
// Gotchas: GLEAN_PATH/GLEAN_ROOT entries point at workspaces, their `src` subdirectory is what gets searched.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "glean.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub search_roots: Vec<PathBuf>,
    pub base_roots: Vec<PathBuf>,
    pub source_ext: String,
    pub skip_tests: bool,
    /// Build tags assumed off; files whose constraint needs one are not scanned.
    pub exclude_tags: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_roots: vec![],
            base_roots: vec![],
            source_ext: "go".to_string(),
            skip_tests: true,
            exclude_tags: vec!["ignore".to_string(), "tools".to_string()],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    search_roots: Option<Vec<PathBuf>>,
    #[serde(default)]
    base_roots: Option<Vec<PathBuf>>,
    #[serde(default)]
    source_ext: Option<String>,
    #[serde(default)]
    skip_tests: Option<bool>,
    #[serde(default)]
    exclude_tags: Option<Vec<String>>,
}

impl Config {
    pub fn load(root_dir: &Path) -> anyhow::Result<Self> {
        Self::load_with_env(root_dir, |k| std::env::var(k).ok())
    }

    pub fn load_with_env<F>(root_dir: &Path, env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        let path = root_dir.join(CONFIG_FILE);
        if path.exists() {
            let text =
                fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            let file: ConfigFile =
                toml::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
            if let Some(v) = file.search_roots {
                cfg.search_roots = v.into_iter().map(|p| root_dir.join(p)).collect();
            }
            if let Some(v) = file.base_roots {
                cfg.base_roots = v.into_iter().map(|p| root_dir.join(p)).collect();
            }
            if let Some(v) = file.source_ext {
                cfg.source_ext = v;
            }
            if let Some(v) = file.skip_tests {
                cfg.skip_tests = v;
            }
            if let Some(v) = file.exclude_tags {
                cfg.exclude_tags = v;
            }
        }

        if let Some(v) = env("GLEAN_PATH").filter(|v| !v.trim().is_empty()) {
            cfg.search_roots = std::env::split_paths(&v)
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| root_dir.join(p).join("src"))
                .collect();
        }
        if let Some(v) = env("GLEAN_ROOT").filter(|v| !v.trim().is_empty()) {
            cfg.base_roots = vec![root_dir.join(v.trim()).join("src")];
        }
        if let Some(v) = env("GLEAN_SOURCE_EXT") {
            let v = v.trim().trim_start_matches('.');
            if !v.is_empty() {
                cfg.source_ext = v.to_string();
            }
        }
        // Set but empty clears the list, so every constrained file gets scanned.
        if let Some(v) = env("GLEAN_EXCLUDE_TAGS") {
            cfg.exclude_tags = v
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(cfg)
    }
}
