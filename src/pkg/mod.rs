// Purpose: Dependency-discovery module root: import scanning, resolution, graph walk, compaction, emission.
// Inputs/Outputs: Re-exports the discovery pipeline used by the CLI and by embedding tools.
// Invariants: Data flows resolve -> walk -> compact -> build; no stage reaches back into an earlier one.
// Gotchas: Keep base-distribution knowledge behind PackageSource; nothing here may hardcode a toolchain layout.

pub mod compact;
pub mod constraint;
pub mod deps;
pub mod discover;
pub mod error;
pub mod import_scan;
pub mod manifest;
pub mod resolve;
pub mod walk;

pub use compact::{canonical_root, compact};
pub use deps::{DependencyRecord, build};
pub use discover::{Discovery, discover};
pub use error::{DiscoveryError, EnvironmentError, ResolutionError};
pub use manifest::Manifest;
pub use resolve::{PackageDescriptor, PackageSource, SourceTree};
pub use walk::{VisitedSet, walk};
