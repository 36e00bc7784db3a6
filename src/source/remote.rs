use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use super::known::{match_repo, match_repo_url, RepoMatch};
use super::version::{commit_for, strip_major_suffix};
use super::{RepoDescriptor, SourceHost};

/// Resolves module repositories from well-known hosts, falling back to the
/// `go-import` meta tag served at `https://<module>?go-get=1`.
pub struct RemoteSourceHost {
    client: Client,
}

impl RemoteSourceHost {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mod-licenses/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Resolve a vanity import path. The match's `root` is the import
    /// prefix declared by the meta tag.
    async fn discover(&self, module_path: &str) -> Result<RepoMatch> {
        let url = format!("https://{module_path}?go-get=1");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?;
        if !response.status().is_success() {
            anyhow::bail!("fetching {url}: HTTP {}", response.status());
        }
        let html = response.text().await?;

        let (prefix, repo_url) = parse_go_import(&html, module_path)?
            .with_context(|| format!("no go-import meta tag for {module_path} at {url}"))?;
        let repo = match_repo_url(&repo_url)
            .with_context(|| format!("unsupported source host {repo_url} for {module_path}"))?;
        Ok(RepoMatch {
            root: prefix,
            ..repo
        })
    }
}

#[async_trait]
impl SourceHost for RemoteSourceHost {
    async fn module_info(&self, module_path: &str, version: &str) -> Result<RepoDescriptor> {
        let repo = match match_repo(module_path) {
            Some(repo) => repo,
            None => self.discover(module_path).await?,
        };

        let relative = module_path
            .strip_prefix(repo.root.as_str())
            .unwrap_or("")
            .trim_start_matches('/');
        let commit = commit_for(version, relative)?;
        tracing::debug!(
            "{module_path}@{version}: repo {} dir {relative:?} commit {commit:?}",
            repo.repo_url
        );

        Ok(RepoDescriptor {
            repo_url: repo.repo_url,
            module_dir: strip_major_suffix(relative).to_string(),
            commit,
            kind: repo.kind,
        })
    }
}

/// Find the `go-import` meta tag covering `module_path`, returning its
/// import prefix and repository URL. The longest matching prefix wins.
pub fn parse_go_import(html: &str, module_path: &str) -> Result<Option<(String, String)>> {
    let meta = Regex::new(r"(?is)<meta\s[^>]*>")?;
    let name = Regex::new(r#"(?i)name\s*=\s*["']([^"']*)["']"#)?;
    let content = Regex::new(r#"(?i)content\s*=\s*["']([^"']*)["']"#)?;

    let mut best: Option<(String, String)> = None;
    for tag in meta.find_iter(html) {
        let tag = tag.as_str();
        let is_go_import = name
            .captures(tag)
            .is_some_and(|c| c[1].eq_ignore_ascii_case("go-import"));
        if !is_go_import {
            continue;
        }
        let Some(c) = content.captures(tag) else {
            continue;
        };
        let fields: Vec<&str> = c[1].split_whitespace().collect();
        let [prefix, vcs, repo] = fields.as_slice() else {
            continue;
        };
        // "mod" entries point at a module proxy, not a repository.
        if *vcs == "mod" {
            continue;
        }
        let covers = module_path == *prefix
            || module_path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'));
        let longer = best.as_ref().map_or(true, |(p, _)| prefix.len() > p.len());
        if covers && longer {
            best = Some((prefix.to_string(), repo.to_string()));
        }
    }
    Ok(best)
}
