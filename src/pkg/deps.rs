use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DependencyRecord {
    pub package: String,
    /// Optional label carried into the manifest entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DependencyRecord {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: None,
        }
    }
}

/// Sorted dependency list from compacted roots, without the project's own root.
pub fn build(roots: &HashSet<String>, root_canonical_path: &str) -> Vec<DependencyRecord> {
    let mut out: Vec<&String> = roots
        .iter()
        .filter(|r| r.as_str() != root_canonical_path)
        .collect();
    out.sort();
    out.into_iter()
        .map(|r| {
            info!("found reference to {}", r);
            DependencyRecord::new(r.as_str())
        })
        .collect()
}
