use serde::Serialize;

use crate::pkg::deps::DependencyRecord;

/// Detected dependencies in the shape of a project manifest.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub import: Vec<Dependency>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dependency {
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Manifest {
    pub fn from_records(package: Option<String>, records: &[DependencyRecord]) -> Self {
        Self {
            package,
            import: records
                .iter()
                .map(|r| Dependency {
                    package: r.package.clone(),
                    name: r.name.clone(),
                })
                .collect(),
        }
    }

    /// Scalars are written double-quoted so paths holding `: ` or `#` stay intact.
    pub fn to_pretty_yaml(&self) -> String {
        let mut out = String::new();
        out.push_str("# Detected project's dependencies.\n");
        if let Some(p) = &self.package {
            out.push_str(&format!("package: {:?}\n", p));
        }
        if self.import.is_empty() {
            out.push_str("import: []\n");
            return out;
        }
        out.push_str("import:\n");
        for d in &self.import {
            out.push_str(&format!("  - package: {:?}\n", d.package));
            if let Some(name) = &d.name {
                out.push_str(&format!("    name: {:?}\n", name));
            }
        }
        out
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
