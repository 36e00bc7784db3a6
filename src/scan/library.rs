use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::{Module, Package};
use crate::source::{SourceHost, DEFAULT_BRANCH};

/// Packages covered by the same license file.
#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    /// File holding the license; `None` for a package with no license found.
    pub license_path: Option<PathBuf>,
    /// Import paths of the member packages, in discovery order.
    pub packages: Vec<String>,
    pub(crate) module: Option<Arc<Module>>,
}

impl Library {
    /// Common `/`-bounded prefix of the member import paths.
    pub fn name(&self) -> String {
        common_ancestor(&self.packages)
    }

    /// Version of the representative module, `""` when unknown.
    pub fn version(&self) -> &str {
        self.module.as_deref().map_or("", |m| m.version.as_str())
    }

    pub fn module(&self) -> Option<&Module> {
        self.module.as_deref()
    }

    /// Browsable URL of `file_path` (an absolute path inside the module) at
    /// the module's source host.
    ///
    /// Modules without a version (the main module under development) are
    /// linked at the default branch, so the URL can drift from the local
    /// file. Nested modules whose layout differs from the repository's can
    /// still produce a wrong path.
    pub async fn file_url(&self, host: &dyn SourceHost, file_path: &Path) -> Result<String> {
        self.resolve_file_url(host, file_path)
            .await
            .with_context(|| format!("getting file URL in library {}", self.name()))
    }

    async fn resolve_file_url(&self, host: &dyn SourceHost, file_path: &Path) -> Result<String> {
        let module = self.module.as_deref().context("empty go module info")?;
        if module.dir.as_os_str().is_empty() {
            anyhow::bail!("empty go module dir");
        }

        let mut remote = host.module_info(&module.path, &module.version).await?;
        if module.version.is_empty() {
            remote.set_commit(DEFAULT_BRANCH);
            tracing::warn!(
                "module {} has empty version, defaults to {DEFAULT_BRANCH}. The license URL may be incorrect. Please verify!",
                module.path
            );
        }

        let relative = file_path.strip_prefix(&module.dir).with_context(|| {
            format!(
                "{} is not inside module dir {}",
                file_path.display(),
                module.dir.display()
            )
        })?;
        Ok(remote.file_url(&slash_path(relative)))
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Longest common prefix of `paths` that ends on a `/` boundary.
///
/// A single path is its own ancestor. When one path is a prefix of the
/// other the shorter one is returned whole.
pub fn common_ancestor(paths: &[String]) -> String {
    match paths {
        [] => String::new(),
        [only] => only.clone(),
        _ => {
            let mut sorted: Vec<&str> = paths.iter().map(String::as_str).collect();
            sorted.sort_unstable();
            let (min, max) = (sorted[0].as_bytes(), sorted[sorted.len() - 1].as_bytes());
            let mut last_slash = 0;
            for (i, (a, b)) in min.iter().zip(max).enumerate() {
                if a != b {
                    return sorted[0][..last_slash].to_string();
                }
                if *a == b'/' {
                    last_slash = i;
                }
            }
            sorted[0].to_string()
        }
    }
}

/// Group packages by the license file found for them.
///
/// Packages sharing a license path form one library whose module is that
/// of the first member with one; packages without a license become
/// single-member libraries. The result is sorted by name (stable, so equal
/// names keep discovery order).
pub fn group_libraries<'g>(found: impl IntoIterator<Item = (&'g Package, Option<PathBuf>)>) -> Vec<Library> {
    let mut buckets: Vec<(Option<PathBuf>, Vec<&'g Package>)> = Vec::new();
    let mut index: HashMap<Option<PathBuf>, usize> = HashMap::new();
    // Test variants share their package's import path; each path joins once.
    let mut seen: HashSet<(usize, &'g str)> = HashSet::new();
    for (pkg, license_path) in found {
        let slot = *index.entry(license_path.clone()).or_insert_with(|| {
            buckets.push((license_path, Vec::new()));
            buckets.len() - 1
        });
        if seen.insert((slot, pkg.import_path.as_str())) {
            buckets[slot].1.push(pkg);
        }
    }

    let mut libraries = Vec::new();
    for (license_path, pkgs) in buckets {
        match license_path {
            None => libraries.extend(pkgs.into_iter().map(|p| Library {
                license_path: None,
                packages: vec![p.import_path.clone()],
                module: p.module.clone(),
            })),
            Some(path) => libraries.push(Library {
                license_path: Some(path),
                packages: pkgs.iter().map(|p| p.import_path.clone()).collect(),
                module: pkgs.iter().find_map(|p| p.module.clone()),
            }),
        }
    }

    sort_libraries(&mut libraries);
    libraries
}

/// Order libraries by name for diff-stable reports.
pub fn sort_libraries(libraries: &mut [Library]) {
    libraries.sort_by_cached_key(Library::name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::filter::tests::{module, package};
    use crate::source::{HostKind, RepoDescriptor};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn names(libs: &[Library]) -> Vec<String> {
        libs.iter().map(Library::name).collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_common_ancestor() {
        assert_eq!(common_ancestor(&strings(&["a/b/c", "a/b/d"])), "a/b");
        assert_eq!(common_ancestor(&strings(&["a/b/c"])), "a/b/c");
        assert_eq!(common_ancestor(&strings(&["a/bc", "a/bd"])), "a");
        assert_eq!(common_ancestor(&strings(&["x/y", "z/y"])), "");
        assert_eq!(common_ancestor(&strings(&["a/b", "a/b/c"])), "a/b");
        assert_eq!(common_ancestor(&[]), "");
    }

    #[test]
    fn test_name_independent_of_member_order() {
        let a = strings(&["m/z/q", "m/a", "m/k/v"]);
        let b = strings(&["m/k/v", "m/z/q", "m/a"]);
        assert_eq!(common_ancestor(&a), common_ancestor(&b));
        assert_eq!(common_ancestor(&a), "m");
    }

    #[test]
    fn test_grouping_by_license_path() {
        let m = module("example.com/m", "v1.2.3", "/src/m");
        let n = module("example.com/n", "v0.1.0", "/src/n");
        let x = package("example.com/m/x", "/src/m/x/x.go", Some(&m));
        let y = package("example.com/m/y", "/src/m/y/y.go", Some(&m));
        let lone1 = package("example.com/n/p", "/src/n/p/p.go", Some(&n));
        let lone2 = package("example.com/n/q", "/src/n/q/q.go", Some(&n));

        let libs = group_libraries(vec![
            (&x, Some(PathBuf::from("/src/m/LICENSE"))),
            (&lone2, None),
            (&y, Some(PathBuf::from("/src/m/LICENSE"))),
            (&lone1, None),
        ]);

        assert_eq!(names(&libs), vec!["example.com/m", "example.com/n/p", "example.com/n/q"]);
        assert_eq!(libs[0].packages, strings(&["example.com/m/x", "example.com/m/y"]));
        assert_eq!(libs[0].version(), "v1.2.3");
        assert_eq!(libs[0].license_path, Some(PathBuf::from("/src/m/LICENSE")));
        assert!(libs[1..].iter().all(|l| l.license_path.is_none() && l.packages.len() == 1));
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let m = module("m", "v1.0.0", "/m");
        let pkgs: Vec<Package> = (0..6)
            .map(|i| package(&format!("m/p{i}"), &format!("/m/p{i}/f.go"), Some(&m)))
            .collect();
        let license = |i: usize| match i % 3 {
            0 => None,
            1 => Some(PathBuf::from("/m/LICENSE")),
            _ => Some(PathBuf::from("/m/p2/COPYING")),
        };
        let libs = group_libraries(pkgs.iter().enumerate().map(|(i, p)| (p, license(i))));

        let mut members: Vec<String> = libs.iter().flat_map(|l| l.packages.clone()).collect();
        members.sort();
        let mut expected: Vec<String> = pkgs.iter().map(|p| p.import_path.clone()).collect();
        expected.sort();
        assert_eq!(members, expected);
        assert_eq!(libs.len(), 4);

        let again = group_libraries(pkgs.iter().enumerate().map(|(i, p)| (p, license(i))));
        assert_eq!(libs, again);
    }

    #[test]
    fn test_module_from_first_member_with_one() {
        let m = module("m", "v1.0.0", "/m");
        let bare = package("m/a", "/m/a/a.go", None);
        let with = package("m/b", "/m/b/b.go", Some(&m));
        let libs = group_libraries(vec![
            (&bare, Some(PathBuf::from("/m/LICENSE"))),
            (&with, Some(PathBuf::from("/m/LICENSE"))),
        ]);
        assert_eq!(libs[0].module(), Some(&*m));
    }

    /// Hands out a fixed descriptor and remembers what it was asked for.
    struct FakeHost {
        asked: Mutex<Vec<(String, String)>>,
    }

    impl FakeHost {
        fn new() -> Self {
            Self {
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SourceHost for FakeHost {
        async fn module_info(&self, module_path: &str, version: &str) -> Result<RepoDescriptor> {
            self.asked
                .lock()
                .unwrap()
                .push((module_path.to_string(), version.to_string()));
            Ok(RepoDescriptor {
                repo_url: format!("https://{module_path}"),
                module_dir: String::new(),
                commit: version.to_string(),
                kind: HostKind::GitHub,
            })
        }
    }

    fn library(module: Option<Arc<Module>>) -> Library {
        Library {
            license_path: Some(PathBuf::from("/src/m/LICENSE")),
            packages: strings(&["example.com/m/x", "example.com/m/y"]),
            module,
        }
    }

    #[tokio::test]
    async fn test_file_url_relative_to_module_dir() {
        let host = FakeHost::new();
        let lib = library(Some(module("example.com/m", "v1.2.3", "/src/m")));
        let url = lib
            .file_url(&host, Path::new("/src/m/LICENSE"))
            .await
            .unwrap();
        assert_eq!(url, "https://example.com/m/blob/v1.2.3/LICENSE");
        assert_eq!(
            host.asked.lock().unwrap().as_slice(),
            &[("example.com/m".to_string(), "v1.2.3".to_string())]
        );

        let nested = lib
            .file_url(&host, Path::new("/src/m/third_party/x/LICENSE"))
            .await
            .unwrap();
        assert_eq!(nested, "https://example.com/m/blob/v1.2.3/third_party/x/LICENSE");
    }

    #[tokio::test]
    async fn test_empty_version_uses_default_branch() {
        let host = FakeHost::new();
        let lib = library(Some(module("example.com/m", "", "/src/m")));
        let url = lib
            .file_url(&host, Path::new("/src/m/LICENSE"))
            .await
            .unwrap();
        assert_eq!(url, "https://example.com/m/blob/HEAD/LICENSE");
    }

    #[tokio::test]
    async fn test_file_url_failures() {
        let host = FakeHost::new();

        let err = library(None)
            .file_url(&host, Path::new("/src/m/LICENSE"))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("empty go module info"));

        let err = library(Some(module("example.com/m", "v1.0.0", "")))
            .file_url(&host, Path::new("/src/m/LICENSE"))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("empty go module dir"));

        let err = library(Some(module("example.com/m", "v1.0.0", "/src/m")))
            .file_url(&host, Path::new("/elsewhere/LICENSE"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("getting file URL in library example.com/m"));
        assert!(host.asked.lock().unwrap().len() == 1);
    }
}
