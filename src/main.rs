// Purpose: Binary entry point for the glean dependency-discovery CLI.
// Inputs/Outputs: Process argv in, manifest on stdout and diagnostics on stderr, process exit code out.
// Invariants: All argument handling and error reporting live in cli::run_cli; this file only forwards.
// Gotchas: std::process::exit skips destructors, so nothing here may hold buffered state.

fn main() {
    let code = glean::cli::run_cli(std::env::args().skip(1));
    std::process::exit(code);
}
