use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::pkg::discover::discover;
use crate::pkg::manifest::Manifest;
use crate::pkg::resolve::SourceTree;
use crate::pkg::walk::absolute_root;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Guess { dir: PathBuf, json: bool },
    Version,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub quiet: bool,
}

pub fn parse_args<I>(args: I) -> Result<Invocation, String>
where
    I: IntoIterator<Item = String>,
{
    let mut quiet = false;
    let mut json = false;
    let mut positional: Vec<String> = vec![];
    for arg in args {
        match arg.as_str() {
            "-q" | "--quiet" => quiet = true,
            "--json" => json = true,
            "-h" | "--help" => {
                return Ok(Invocation {
                    command: Command::Help,
                    quiet,
                });
            }
            s if s.starts_with('-') && s != "-" => return Err(format!("unknown argument: {}", s)),
            other => positional.push(other.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None | Some("help") => Command::Help,
        Some("version") => Command::Version,
        Some("guess") => {
            let dir = positional.next().unwrap_or_else(|| ".".to_string());
            Command::Guess {
                dir: PathBuf::from(dir),
                json,
            }
        }
        Some(other) => return Err(format!("unknown command: {}", other)),
    };
    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument: {}", extra));
    }
    Ok(Invocation { command, quiet })
}

fn init_logging(quiet: bool) {
    let default_level = if quiet {
        "warn"
    } else if std::env::var("GLEAN_TRACE").ok().as_deref() == Some("1") {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

pub fn version_string() -> String {
    match option_env!("GLEAN_GIT_COMMIT") {
        Some(commit) => format!("glean {} ({})", env!("CARGO_PKG_VERSION"), commit),
        None => format!("glean {}", env!("CARGO_PKG_VERSION")),
    }
}

// Precondition: `dir` names the project directory to analyse (relative paths use the process cwd).
// Postcondition: Returns the rendered manifest document; nothing is written to disk.
// Side effects: Reads glean.toml, environment, and source files under configured roots.
pub fn cmd_guess(dir: PathBuf, json: bool) -> anyhow::Result<String> {
    let dir = absolute_root(&dir)?;
    let cfg = Config::load(&dir)?;
    let tree = SourceTree::from_config(&cfg);
    let found = discover(&tree, &dir)?;

    let package = Some(found.root_import_path.clone()).filter(|p| !p.starts_with("_/"));
    let manifest = Manifest::from_records(package, &found.dependencies);
    if json {
        manifest.to_json()
    } else {
        Ok(manifest.to_pretty_yaml())
    }
}

pub fn run_cli<I>(args: I) -> i32
where
    I: IntoIterator<Item = String>,
{
    let inv = match parse_args(args) {
        Ok(inv) => inv,
        Err(msg) => {
            eprintln!("{}", msg);
            print_usage();
            return 1;
        }
    };
    init_logging(inv.quiet);

    match inv.command {
        Command::Help => {
            print_usage();
            0
        }
        Command::Version => {
            println!("{}", version_string());
            0
        }
        Command::Guess { dir, json } => match cmd_guess(dir, json) {
            Ok(doc) => {
                print!("{}", doc);
                0
            }
            Err(err) => {
                eprintln!("error: {:#}", err);
                1
            }
        },
    }
}

fn print_usage() {
    eprintln!("usage: glean guess [dir] [--json] [-q]");
    eprintln!("   or: glean version");
    eprintln!();
    eprintln!("Search roots come from glean.toml in [dir] or GLEAN_PATH;");
    eprintln!("the base distribution from glean.toml or GLEAN_ROOT.");
}
