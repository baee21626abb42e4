// Purpose: Chain walk -> compact -> build into one dependency-discovery call.
// Inputs/Outputs: PackageSource + root dir in, the root's import path and sorted dependency records out.
// Invariants: The root's own canonical path never appears in the result; failures yield no list at all.
// Gotchas: Each call owns its visited set; nothing is cached between calls.

use std::path::Path;
use tracing::debug;

use crate::pkg::compact::{canonical_root, compact};
use crate::pkg::deps::{DependencyRecord, build};
use crate::pkg::error::DiscoveryError;
use crate::pkg::resolve::PackageSource;
use crate::pkg::walk::walk_from;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub root_import_path: String,
    pub dependencies: Vec<DependencyRecord>,
}

pub fn discover<S: PackageSource + ?Sized>(
    source: &S,
    root_dir: &Path,
) -> Result<Discovery, DiscoveryError> {
    let (root_import_path, visited) = walk_from(source, root_dir)?;
    debug!(root = %root_import_path, packages = visited.len(), "walk complete");
    let roots = compact(&visited);
    let dependencies = build(&roots, &canonical_root(&root_import_path));
    Ok(Discovery {
        root_import_path,
        dependencies,
    })
}
