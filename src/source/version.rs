use anyhow::Result;
use regex::Regex;

/// Go pseudo-versions: `vX.0.0-yyyymmddhhmmss-abcdefabcdef` and the
/// `vX.Y.(Z+1)-0.yyyymmddhhmmss-...` / `vX.Y.Z-pre.0.yyyymmddhhmmss-...` forms.
const PSEUDO_VERSION: &str =
    r"^v[0-9]+\.(0\.0-|\d+\.\d+-([^+]*\.)?0\.)\d{14}-[A-Za-z0-9]+(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$";

pub fn is_pseudo_version(version: &str) -> Result<bool> {
    Ok(Regex::new(PSEUDO_VERSION)?.is_match(version))
}

/// Drop a trailing `/vN` major-version element (N > 1), as in
/// `sub/v2` -> `sub` or `v3` -> `""`.
pub fn strip_major_suffix(module_dir: &str) -> &str {
    let (head, last) = match module_dir.rsplit_once('/') {
        Some((head, last)) => (head, last),
        None => ("", module_dir),
    };
    let is_major = last
        .strip_prefix('v')
        .and_then(|n| n.parse::<u32>().ok())
        .is_some_and(|n| n > 1);
    if is_major {
        head
    } else {
        module_dir
    }
}

/// The commit or tag a module version was published from.
///
/// Pseudo-versions carry the commit hash. Release versions are tags; for a
/// module nested in a repository subdirectory the tag is prefixed with that
/// directory. An empty version yields an empty commit.
pub fn commit_for(version: &str, module_dir: &str) -> Result<String> {
    let version = version.trim_end_matches("+incompatible");
    if version.is_empty() {
        return Ok(String::new());
    }
    if is_pseudo_version(version)? {
        let hash = version.rsplit('-').next().unwrap_or(version);
        return Ok(hash.to_string());
    }
    let prefix = strip_major_suffix(module_dir);
    if prefix.is_empty() {
        Ok(version.to_string())
    } else {
        Ok(format!("{prefix}/{version}"))
    }
}
