use std::collections::HashSet;

/// Reduce an import path to its repository root: the first three `/`
/// segments when there are four or more, otherwise the path itself.
///
/// This assumes a host/org/repo layout. Packages hosted at other depths
/// (e.g. `host/group/subgroup/repo/pkg`) compact to the wrong root; callers
/// rely on this exact behavior, so it is kept as is.
pub fn canonical_root(import_path: &str) -> String {
    let parts: Vec<&str> = import_path.splitn(4, '/').collect();
    if parts.len() < 4 {
        import_path.to_string()
    } else {
        parts[..3].join("/")
    }
}

/// Canonical roots of `paths`, with every root that lies under another root
/// in the set dropped. The result never holds two entries where one is a
/// `/`-prefix of the other.
pub fn compact<'a, I>(paths: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let roots: HashSet<String> = paths.into_iter().map(|p| canonical_root(p)).collect();
    roots
        .iter()
        .filter(|r| !has_root_above(r, &roots))
        .cloned()
        .collect()
}

fn has_root_above(path: &str, roots: &HashSet<String>) -> bool {
    path.match_indices('/')
        .any(|(i, _)| i > 0 && roots.contains(&path[..i]))
}
