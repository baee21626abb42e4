// Purpose: Resolve one import path, relative to an explicit working directory, into a package descriptor.
// Inputs/Outputs: Import string + working dir in, directory/imports/base-distribution flag out.
// Invariants: Resolution is read-only; base-distribution packages are reported, never expanded here.
// Gotchas: Local import paths are derived lexically; symlinked search roots must be configured as seen by callers.

use std::fs;
use std::path::{Component, Path, PathBuf};
use strsim::jaro_winkler;
use tracing::debug;

use crate::config::Config;
use crate::pkg::error::ResolutionError;
use crate::pkg::import_scan::{collect_source_files, scan_source_file};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub import_path: String,
    pub dir: PathBuf,
    /// Immediate imports in first-seen order across the package's files.
    pub imports: Vec<String>,
    pub is_base_distribution: bool,
}

/// Capability supplied by the hosting toolchain: locate a package, say whether
/// it ships with the toolchain, and list what it imports.
pub trait PackageSource {
    fn resolve(
        &self,
        import: &str,
        working_dir: &Path,
    ) -> Result<PackageDescriptor, ResolutionError>;
}

impl<T: PackageSource + ?Sized> PackageSource for &T {
    fn resolve(
        &self,
        import: &str,
        working_dir: &Path,
    ) -> Result<PackageDescriptor, ResolutionError> {
        (**self).resolve(import, working_dir)
    }
}

/// Filesystem-backed source: import paths address directories under search
/// roots, base-distribution packages live under base roots.
#[derive(Debug, Clone)]
pub struct SourceTree {
    search_roots: Vec<PathBuf>,
    base_roots: Vec<PathBuf>,
    source_ext: String,
    skip_tests: bool,
    exclude_tags: Vec<String>,
}

impl SourceTree {
    pub fn new(search_roots: Vec<PathBuf>, base_roots: Vec<PathBuf>) -> Self {
        Self {
            search_roots: search_roots.iter().map(|p| normalize(p)).collect(),
            base_roots: base_roots.iter().map(|p| normalize(p)).collect(),
            source_ext: "go".to_string(),
            skip_tests: true,
            exclude_tags: vec!["ignore".to_string(), "tools".to_string()],
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let mut tree = Self::new(cfg.search_roots.clone(), cfg.base_roots.clone());
        tree.source_ext = cfg.source_ext.clone();
        tree.skip_tests = cfg.skip_tests;
        tree.exclude_tags = cfg.exclude_tags.clone();
        tree
    }

    pub fn with_source_ext(mut self, ext: impl Into<String>) -> Self {
        self.source_ext = ext.into();
        self
    }

    pub fn with_exclude_tags(mut self, tags: Vec<String>) -> Self {
        self.exclude_tags = tags;
        self
    }

    /// Import path of a directory reached through a local import: relative to
    /// the first search root containing it, else `_` plus its absolute path.
    pub fn local_import_path(&self, dir: &Path) -> String {
        for root in &self.search_roots {
            if let Ok(rel) = dir.strip_prefix(root)
                && rel.components().next().is_some()
            {
                return slash_path(rel);
            }
        }
        format!("_/{}", slash_path(dir).trim_start_matches('/'))
    }

    fn scan_package(
        &self,
        import: &str,
        import_path: String,
        dir: PathBuf,
        listing_dir: &Path,
    ) -> Result<PackageDescriptor, ResolutionError> {
        let files =
            collect_source_files(&dir, &self.source_ext, self.skip_tests).map_err(|source| {
                ResolutionError::Read {
                    import: import.to_string(),
                    path: dir.clone(),
                    source,
                }
            })?;
        let mut imports: Vec<String> = vec![];
        let mut scanned = 0;
        for f in &files {
            let found = scan_source_file(f, &self.exclude_tags).map_err(|source| {
                ResolutionError::Read {
                    import: import.to_string(),
                    path: f.clone(),
                    source,
                }
            })?;
            let Some(found) = found else {
                debug!(file = %f.display(), "build constraint excludes file");
                continue;
            };
            scanned += 1;
            for im in found {
                if !imports.contains(&im) {
                    imports.push(im);
                }
            }
        }
        if scanned == 0 {
            return Err(ResolutionError::NoSourceFiles {
                import: import.to_string(),
                suggestion: suggest_sibling(import, listing_dir),
                dir,
                ext: self.source_ext.clone(),
            });
        }
        debug!(
            import_path = %import_path,
            dir = %dir.display(),
            imports = imports.len(),
            "resolved package"
        );
        Ok(PackageDescriptor {
            import_path,
            dir,
            imports,
            is_base_distribution: false,
        })
    }

    fn resolve_local(
        &self,
        import: &str,
        working_dir: &Path,
    ) -> Result<PackageDescriptor, ResolutionError> {
        let dir = normalize(&working_dir.join(import));
        let parent = dir.parent().unwrap_or(working_dir).to_path_buf();
        if !dir.is_dir() {
            return Err(ResolutionError::NotFound {
                import: import.to_string(),
                suggestion: suggest_sibling(import, &parent),
                dir,
            });
        }
        let import_path = self.local_import_path(&dir);
        self.scan_package(import, import_path, dir, &parent)
    }

    fn resolve_rooted(
        &self,
        import: &str,
        working_dir: &Path,
    ) -> Result<PackageDescriptor, ResolutionError> {
        for root in &self.base_roots {
            let dir = root.join(import);
            if dir.is_dir() {
                debug!(import, dir = %dir.display(), "base distribution package");
                return Ok(PackageDescriptor {
                    import_path: import.to_string(),
                    dir,
                    imports: vec![],
                    is_base_distribution: true,
                });
            }
        }
        for root in &self.search_roots {
            let dir = root.join(import);
            if dir.is_dir() {
                let parent = dir.parent().unwrap_or(root).to_path_buf();
                return self.scan_package(import, import.to_string(), dir, &parent);
            }
        }

        // Not found anywhere: report against the first root that has the parent directory.
        for root in self.search_roots.iter().chain(self.base_roots.iter()) {
            let dir = root.join(import);
            if let Some(parent) = dir.parent()
                && parent.is_dir()
            {
                return Err(ResolutionError::NotFound {
                    import: import.to_string(),
                    suggestion: suggest_sibling(import, parent),
                    dir,
                });
            }
        }
        Err(ResolutionError::Unknown {
            import: import.to_string(),
            working_dir: working_dir.to_path_buf(),
            searched: self.search_roots.len() + self.base_roots.len(),
        })
    }
}

impl PackageSource for SourceTree {
    fn resolve(
        &self,
        import: &str,
        working_dir: &Path,
    ) -> Result<PackageDescriptor, ResolutionError> {
        if is_local_import(import) {
            self.resolve_local(import, working_dir)
        } else {
            self.resolve_rooted(import, working_dir)
        }
    }
}

pub fn is_local_import(import: &str) -> bool {
    import == "."
        || import == ".."
        || import.starts_with("./")
        || import.starts_with("../")
        || Path::new(import).is_absolute()
}

/// Lexically resolve `.` and `..` without touching the filesystem.
pub fn normalize(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in p.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn slash_path(p: &Path) -> String {
    p.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::Prefix(pre) => Some(pre.as_os_str().to_string_lossy().replace(':', "_")),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
        .replace('\\', "/")
}

fn list_subdirs(dir: &Path) -> Vec<String> {
    let Ok(rd) = fs::read_dir(dir) else {
        return vec![];
    };
    let mut out: Vec<String> = rd
        .filter_map(|ent| ent.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .filter_map(|p| p.file_name().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    out.sort();
    out
}

fn best_name_match<'a>(needle: &str, candidates: &'a [String]) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for c in candidates {
        let score = jaro_winkler(needle, c);
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((c.as_str(), score));
        }
    }
    match best {
        Some((name, score)) if score >= 0.84 => Some(name),
        _ => None,
    }
}

fn suggest_sibling(import: &str, listing_dir: &Path) -> Option<String> {
    let (head, leaf) = match import.rfind('/') {
        Some(i) => (&import[..i], &import[i + 1..]),
        None => ("", import),
    };
    let candidates: Vec<String> = list_subdirs(listing_dir)
        .into_iter()
        .filter(|c| c != leaf)
        .collect();
    let best = best_name_match(leaf, &candidates)?;
    Some(if head.is_empty() {
        best.to_string()
    } else {
        format!("{}/{}", head, best)
    })
}
