// Purpose: Define crate-level module surface for the dependency-discovery core and its CLI.
// Inputs/Outputs: Exposes pkg pipeline, configuration, and CLI entry for binaries/tests.
// Invariants: The pkg modules stay free of process-global state; only cli/config read the environment.
// Gotchas: Keep module wiring consistent with src/main.rs.

pub mod cli;
pub mod config;
pub mod pkg;
