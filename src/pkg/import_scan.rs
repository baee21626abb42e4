use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::pkg::constraint::{excluded_by, file_constraint};

static SINGLE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import[ \t]+(?:(?:[A-Za-z_][A-Za-z0-9_]*|\.)[ \t]+)?"([^"]+)""#)
        .expect("single import pattern")
});

static GROUPED_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import[ \t]*\(([^)]*)\)"#).expect("grouped import pattern")
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("quoted path pattern"));

/// Blank out comments, raw string contents and rune literal contents, so that
/// only real import declarations remain visible to the patterns below.
/// Interpreted strings are kept verbatim since import paths live in them, and
/// line breaks are kept everywhere.
fn strip_non_code(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    let mut in_str: Option<char> = None;
    while let Some(c) = chars.next() {
        if let Some(q) = in_str {
            let keep = q == '"';
            if c == q {
                out.push(c);
                in_str = None;
                continue;
            }
            out.push(if keep || c == '\n' { c } else { ' ' });
            if c == '\\' && q != '`' {
                if let Some(n) = chars.next() {
                    out.push(if keep { n } else { ' ' });
                }
            }
            continue;
        }
        match c {
            '"' | '`' | '\'' => {
                in_str = Some(c);
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                out.push(' ');
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                    out.push(' ');
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str("  ");
                let mut prev = '\0';
                for n in chars.by_ref() {
                    out.push(if n == '\n' { '\n' } else { ' ' });
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Import paths declared in `src`, in first-seen order, without duplicates.
pub fn scan_imports_in_text(src: &str) -> Vec<String> {
    let text = strip_non_code(src);

    let mut found: Vec<(usize, String)> = SINGLE_IMPORT
        .captures_iter(&text)
        .filter_map(|c| c.get(1).map(|m| (m.start(), m.as_str().to_string())))
        .collect();
    for group in GROUPED_IMPORT.captures_iter(&text) {
        let Some(body) = group.get(1) else {
            continue;
        };
        for c in QUOTED.captures_iter(body.as_str()) {
            if let Some(m) = c.get(1) {
                found.push((body.start() + m.start(), m.as_str().to_string()));
            }
        }
    }
    found.sort_by_key(|(at, _)| *at);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter_map(|(_, p)| {
            let p = p.trim().to_string();
            (!p.is_empty() && seen.insert(p.clone())).then_some(p)
        })
        .collect()
}

/// Imports of the file at `p`, or `None` when its build constraint cannot be
/// met without one of `excluded_tags`.
pub fn scan_source_file(p: &Path, excluded_tags: &[String]) -> std::io::Result<Option<Vec<String>>> {
    let s = fs::read_to_string(p)?;
    if !excluded_tags.is_empty()
        && let Some(expr) = file_constraint(&s)
        && excluded_by(&expr, excluded_tags)
    {
        return Ok(None);
    }
    Ok(Some(scan_imports_in_text(&s)))
}

/// Source files with extension `ext` directly inside `dir`, sorted.
/// Test files (`*_test.<ext>`) are left out when `skip_tests` is set.
pub fn collect_source_files(dir: &Path, ext: &str, skip_tests: bool) -> std::io::Result<Vec<PathBuf>> {
    let test_suffix = format!("_test.{}", ext);
    let mut v = vec![];
    for ent in fs::read_dir(dir)? {
        let p = ent?.path();
        if !p.is_file() || p.extension().and_then(|s| s.to_str()) != Some(ext) {
            continue;
        }
        if skip_tests
            && p.file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|n| n.ends_with(&test_suffix))
        {
            continue;
        }
        v.push(p);
    }
    v.sort();
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::{collect_source_files, scan_imports_in_text, scan_source_file};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time drift")
            .as_nanos();
        std::env::temp_dir().join(format!("glean-{}-{}-{}", prefix, std::process::id(), nonce))
    }

    #[test]
    fn scans_single_and_aliased_imports() {
        let src = r#"package main

import "fmt"
import yaml "github.com/kylelemons/go-gypsy/yaml"
import _ "example.com/acme/driver"
import . "example.com/acme/dsl"
"#;
        assert_eq!(
            scan_imports_in_text(src),
            vec![
                "fmt",
                "github.com/kylelemons/go-gypsy/yaml",
                "example.com/acme/driver",
                "example.com/acme/dsl",
            ]
        );
    }

    #[test]
    fn scans_grouped_imports_in_order() {
        let src = r#"package cmd

import (
	"go/build"
	"os"
	cli "github.com/Masterminds/cookoo/cli"

	"github.com/Masterminds/cookoo"
)

func x() {}
"#;
        assert_eq!(
            scan_imports_in_text(src),
            vec![
                "go/build",
                "os",
                "github.com/Masterminds/cookoo/cli",
                "github.com/Masterminds/cookoo",
            ]
        );
    }

    #[test]
    fn ignores_commented_out_imports() {
        let src = r#"package cmd

import (
	//"bytes"
	"strings"
	/* "text/template" */
)

/*
import "never/seen/here"
*/
// import "nor/this"
var s = "import \"not/an/import\""
"#;
        assert_eq!(scan_imports_in_text(src), vec!["strings"]);
    }

    #[test]
    fn ignores_imports_inside_raw_strings() {
        let src = "package main\n\nimport \"fmt\"\n\nconst tpl = `\nimport \"example.com/generated/pkg\"\n`\n";
        assert_eq!(scan_imports_in_text(src), vec!["fmt"]);

        let grouped = "package main\n\nvar doc = `\nimport (\n\t\"example.com/a\"\n)\n`\n\nimport (\n\t\"os\"\n)\n";
        assert_eq!(scan_imports_in_text(grouped), vec!["os"]);
    }

    #[test]
    fn rune_literals_do_not_open_strings() {
        let src = "package p\n\nvar q = '\"'\nvar b = '`'\n\nimport \"strings\"\n";
        assert_eq!(scan_imports_in_text(src), vec!["strings"]);
    }

    #[test]
    fn deduplicates_repeated_imports() {
        let src = "import \"a/b\"\nimport (\n\t\"a/b\"\n\t\"c\"\n)\n";
        assert_eq!(scan_imports_in_text(src), vec!["a/b", "c"]);
    }

    #[test]
    fn no_imports_is_empty() {
        assert!(scan_imports_in_text("package main\n\nfunc main() {}\n").is_empty());
    }

    #[test]
    fn collect_source_files_skips_tests_and_other_extensions() {
        let root = temp_dir("collect");
        fs::create_dir_all(root.join("nested")).expect("mkdir");
        fs::write(root.join("b.go"), "package p").expect("write b");
        fs::write(root.join("a.go"), "package p").expect("write a");
        fs::write(root.join("a_test.go"), "package p").expect("write test");
        fs::write(root.join("README.md"), "docs").expect("write readme");
        fs::write(root.join("nested").join("c.go"), "package q").expect("write nested");

        let files = collect_source_files(&root, "go", true).expect("collect");
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|s| s.to_str()))
            .collect();
        assert_eq!(names, vec!["a.go", "b.go"]);

        let with_tests = collect_source_files(&root, "go", false).expect("collect");
        assert_eq!(with_tests.len(), 3);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn constrained_out_files_are_not_scanned() {
        let root = temp_dir("constraint");
        fs::create_dir_all(&root).expect("mkdir");
        let gen_go = root.join("gen.go");
        fs::write(
            &gen_go,
            "//go:build ignore\n\npackage main\n\nimport \"golang.org/x/tools/cmd/stringer\"\n",
        )
        .expect("write gen");
        let lib = root.join("lib.go");
        fs::write(&lib, "//go:build linux || darwin\n\npackage p\n\nimport \"os\"\n").expect("write lib");

        let excluded = vec!["ignore".to_string(), "tools".to_string()];
        assert_eq!(scan_source_file(&gen_go, &excluded).expect("scan"), None);
        assert_eq!(
            scan_source_file(&lib, &excluded).expect("scan"),
            Some(vec!["os".to_string()])
        );
        assert_eq!(
            scan_source_file(&gen_go, &[]).expect("scan"),
            Some(vec!["golang.org/x/tools/cmd/stringer".to_string()])
        );

        let _ = fs::remove_dir_all(root);
    }
}
