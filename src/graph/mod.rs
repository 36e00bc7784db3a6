//! Package graph loading.
//!
//! The scan itself only consumes a [`PackageGraph`]; how it was produced is
//! up to the [`GraphLoader`]. [`go_list`] drives `go list -json -deps` or
//! parses a stream recorded from it.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

use crate::models::PackageGraph;

pub mod go_list;

pub trait GraphLoader {
    fn load(&self, import_paths: &[String]) -> Result<PackageGraph>;
}

/// Locate the Go standard library root.
///
/// An explicit `configured` root wins, then `$GOROOT`, then `go env GOROOT`.
/// Returns `None` when no Go toolchain can be asked, in which case only
/// packages the loader flags as standard (and `unsafe`) count as standard
/// library.
pub fn detect_go_root(configured: Option<&Path>, go_binary: &str) -> Option<PathBuf> {
    if let Some(root) = configured {
        return Some(root.to_path_buf());
    }
    if let Some(root) = std::env::var_os("GOROOT").filter(|r| !r.is_empty()) {
        return Some(PathBuf::from(root));
    }
    match go_env_goroot(go_binary) {
        Ok(root) => Some(root),
        Err(err) => {
            tracing::warn!(
                "could not determine GOROOT, set `go_root` under [scan] in the config: {err:#}"
            );
            None
        }
    }
}

fn go_env_goroot(go_binary: &str) -> Result<PathBuf> {
    let output = Command::new(go_binary)
        .args(["env", "GOROOT"])
        .output()
        .with_context(|| format!("running `{go_binary} env GOROOT`"))?;
    if !output.status.success() {
        anyhow::bail!(
            "`{go_binary} env GOROOT` failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    let root = String::from_utf8(output.stdout)?.trim().to_string();
    if root.is_empty() {
        anyhow::bail!("`{go_binary} env GOROOT` printed nothing");
    }
    Ok(PathBuf::from(root))
}
