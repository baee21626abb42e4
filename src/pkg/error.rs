use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("import {import}: directory not found: {}{}", .dir.display(), hint_suffix(.suggestion))]
    NotFound {
        import: String,
        dir: PathBuf,
        suggestion: Option<String>,
    },
    #[error("import {import}: no .{ext} files found in {}{}", .dir.display(), hint_suffix(.suggestion))]
    NoSourceFiles {
        import: String,
        dir: PathBuf,
        ext: String,
        suggestion: Option<String>,
    },
    #[error("import {import}: cannot find package in {} (searched {searched} roots)", .working_dir.display())]
    Unknown {
        import: String,
        working_dir: PathBuf,
        searched: usize,
    },
    #[error("import {import}: read {}: {source}", .path.display())]
    Read {
        import: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolutionError {
    pub fn import(&self) -> &str {
        match self {
            ResolutionError::NotFound { import, .. }
            | ResolutionError::NoSourceFiles { import, .. }
            | ResolutionError::Unknown { import, .. }
            | ResolutionError::Read { import, .. } => import,
        }
    }
}

fn hint_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!("\nhelp: did you mean \"{}\"?", s),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
#[error("cannot determine root directory {}: {source}", .dir.display())]
pub struct EnvironmentError {
    pub dir: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Failure of a whole discovery run. Never accompanied by a partial result.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}
