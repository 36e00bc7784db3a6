//! Where a module's source lives, and how to link to a file in it.
//!
//! - [`known`]: hosting services recognised from the import path alone.
//! - [`version`]: turning a module version into a commit or tag.
//! - [`remote`]: [`RemoteSourceHost`](remote::RemoteSourceHost), which falls
//!   back to `?go-get=1` discovery for vanity import paths.

use anyhow::Result;
use async_trait::async_trait;

pub mod known;
pub mod remote;
pub mod version;

pub use known::HostKind;

/// Symbolic reference to a repository's default branch, whatever it is called.
pub const DEFAULT_BRANCH: &str = "HEAD";

/// Source-host metadata collaborator.
#[async_trait]
pub trait SourceHost: Send + Sync {
    async fn module_info(&self, module_path: &str, version: &str) -> Result<RepoDescriptor>;
}

/// A module's repository at one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDescriptor {
    /// Browsable repository root, e.g. `https://github.com/pkg/errors`.
    pub repo_url: String,
    /// The module's directory inside the repository, `""` at the root.
    pub module_dir: String,
    pub commit: String,
    pub kind: HostKind,
}

impl RepoDescriptor {
    pub fn set_commit(&mut self, commit: impl Into<String>) {
        self.commit = commit.into();
    }

    /// URL of `relative_path` (slash separated, relative to the module root).
    pub fn file_url(&self, relative_path: &str) -> String {
        let file = if self.module_dir.is_empty() {
            relative_path.to_string()
        } else {
            format!("{}/{}", self.module_dir, relative_path)
        };
        self.kind.file_url(&self.repo_url, &self.commit, &file)
    }
}
