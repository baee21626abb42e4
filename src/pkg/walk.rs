// Purpose: Compute the transitive closure of non-base-distribution imports reachable from a root directory.
// Inputs/Outputs: PackageSource + root dir in, VisitedSet of import paths out.
// Invariants: A path is marked visited before its imports are expanded; base-distribution packages are never marked.
// Gotchas: Any resolution failure aborts the whole walk; callers never see a partial set.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::pkg::error::{DiscoveryError, EnvironmentError};
use crate::pkg::resolve::PackageSource;

pub type VisitedSet = HashSet<String>;

/// Make `root_dir` absolute against the process working directory.
pub fn absolute_root(root_dir: &Path) -> Result<PathBuf, EnvironmentError> {
    std::path::absolute(root_dir).map_err(|source| EnvironmentError {
        dir: root_dir.to_path_buf(),
        source,
    })
}

/// Walk the import graph rooted at `root_dir`.
///
/// Returns the root package's import path alongside the visited set. The root
/// path is part of the set unless the root itself is a base-distribution
/// package.
pub fn walk_from<S: PackageSource + ?Sized>(
    source: &S,
    root_dir: &Path,
) -> Result<(String, VisitedSet), DiscoveryError> {
    let root_dir = absolute_root(root_dir)?;
    let mut visited = VisitedSet::new();

    let root = source.resolve(".", &root_dir)?;
    let root_path = root.import_path.clone();
    if root.is_base_distribution {
        return Ok((root_path, visited));
    }
    visited.insert(root.import_path.clone());

    // (import, importer dir) pairs still to expand; pushed in reverse so the
    // first import is popped first.
    let mut stack: Vec<(String, PathBuf)> = root
        .imports
        .iter()
        .rev()
        .map(|im| (im.clone(), root.dir.clone()))
        .collect();

    while let Some((import, working_dir)) = stack.pop() {
        if visited.contains(&import) {
            continue;
        }
        let pkg = source.resolve(&import, &working_dir)?;
        if pkg.is_base_distribution {
            continue;
        }
        if !visited.insert(pkg.import_path.clone()) {
            // Reached again through a different spelling (e.g. a relative import).
            continue;
        }
        debug!(import_path = %pkg.import_path, via = %import, "visited");
        for im in pkg.imports.iter().rev() {
            if !visited.contains(im) {
                stack.push((im.clone(), pkg.dir.clone()));
            }
        }
    }
    Ok((root_path, visited))
}

pub fn walk<S: PackageSource + ?Sized>(
    source: &S,
    root_dir: &Path,
) -> Result<VisitedSet, DiscoveryError> {
    walk_from(source, root_dir).map(|(_, visited)| visited)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::pkg::error::ResolutionError;
    use crate::pkg::resolve::{PackageDescriptor, PackageSource};
    use std::cell::Cell;
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};

    /// In-memory import graph. `"."` resolves to the package named `root`.
    pub struct GraphSource {
        pub root: String,
        pub edges: HashMap<String, Vec<String>>,
        pub base: HashSet<String>,
        pub calls: Cell<usize>,
    }

    impl GraphSource {
        pub fn new(root: &str, edges: &[(&str, &[&str])], base: &[&str]) -> Self {
            Self {
                root: root.to_string(),
                edges: edges
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
                    .collect(),
                base: base.iter().map(|s| s.to_string()).collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl PackageSource for GraphSource {
        fn resolve(
            &self,
            import: &str,
            working_dir: &Path,
        ) -> Result<PackageDescriptor, ResolutionError> {
            self.calls.set(self.calls.get() + 1);
            let name = if import == "." { self.root.as_str() } else { import };
            if self.base.contains(name) {
                return Ok(PackageDescriptor {
                    import_path: name.to_string(),
                    dir: PathBuf::from("/goroot/src").join(name),
                    imports: vec![],
                    is_base_distribution: true,
                });
            }
            let imports = self.edges.get(name).ok_or_else(|| ResolutionError::Unknown {
                import: import.to_string(),
                working_dir: working_dir.to_path_buf(),
                searched: 1,
            })?;
            Ok(PackageDescriptor {
                import_path: name.to_string(),
                dir: PathBuf::from("/work/src").join(name),
                imports: imports.clone(),
                is_base_distribution: false,
            })
        }
    }
}
