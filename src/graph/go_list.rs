use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::{Module, Package, PackageGraph, PackageId};

/// One object of the `go list -json` stream. Only the fields the scan needs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedPackage {
    /// Unique per listing. Test variants carry a ` [pkg.test]` suffix.
    import_path: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    dir: PathBuf,
    #[serde(default)]
    go_files: Vec<String>,
    #[serde(default)]
    compiled_go_files: Vec<String>,
    #[serde(default)]
    c_files: Vec<String>,
    #[serde(default, rename = "CXXFiles")]
    cxx_files: Vec<String>,
    #[serde(default)]
    m_files: Vec<String>,
    #[serde(default)]
    h_files: Vec<String>,
    #[serde(default)]
    f_files: Vec<String>,
    #[serde(default)]
    s_files: Vec<String>,
    #[serde(default)]
    swig_files: Vec<String>,
    #[serde(default, rename = "SwigCXXFiles")]
    swig_cxx_files: Vec<String>,
    #[serde(default)]
    syso_files: Vec<String>,
    module: Option<ListedModule>,
    #[serde(default)]
    imports: Vec<String>,
    error: Option<ListedError>,
    /// Set for packages that are only listed because something depends on them.
    #[serde(default)]
    dep_only: bool,
    #[serde(default)]
    standard: bool,
    #[serde(default)]
    goroot: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedModule {
    #[serde(default)]
    path: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    dir: PathBuf,
    replace: Option<Box<ListedModule>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedError {
    err: String,
}

impl ListedPackage {
    fn other_files(&self) -> impl Iterator<Item = &String> {
        self.c_files
            .iter()
            .chain(&self.cxx_files)
            .chain(&self.m_files)
            .chain(&self.h_files)
            .chain(&self.f_files)
            .chain(&self.s_files)
            .chain(&self.swig_files)
            .chain(&self.swig_cxx_files)
            .chain(&self.syso_files)
    }

    /// The import path without the test-variant suffix, so
    /// `m/a [m/a.test]` and `m/a` name the same package.
    fn package_path(&self) -> &str {
        self.import_path
            .split_once(" [")
            .map_or(self.import_path.as_str(), |(path, _)| path)
    }
}

/// Collapse a listed module into the identity the scan works with.
///
/// A `replace` directive substitutes the whole module (path, version and
/// directory). The `+incompatible` suffix does not change which source is
/// used, so it is dropped from the version.
fn normalize_module(listed: &ListedModule) -> Module {
    let effective = listed.replace.as_deref().unwrap_or(listed);
    Module {
        path: effective.path.clone(),
        version: effective
            .version
            .trim_end_matches("+incompatible")
            .to_string(),
        dir: effective.dir.clone(),
    }
}

/// Parse a concatenated `go list -json` object stream into a graph.
pub fn parse_stream(content: &str) -> Result<PackageGraph> {
    let listed: Vec<ListedPackage> = serde_json::Deserializer::from_str(content)
        .into_iter::<ListedPackage>()
        .collect::<Result<_, _>>()
        .context("parsing go list output")?;

    let mut ids: HashMap<String, PackageId> = HashMap::new();
    let mut modules: HashMap<Module, Arc<Module>> = HashMap::new();
    let mut graph = PackageGraph::default();
    let mut kept: Vec<&ListedPackage> = Vec::new();

    for entry in &listed {
        if ids.contains_key(&entry.import_path) {
            tracing::debug!("duplicate package {} in go list output", entry.import_path);
            continue;
        }
        let module = entry.module.as_ref().map(|m| {
            let module = normalize_module(m);
            modules
                .entry(module.clone())
                .or_insert_with(|| Arc::new(module))
                .clone()
        });
        let id = graph.packages.len();
        ids.insert(entry.import_path.clone(), id);
        kept.push(entry);
        graph.packages.push(Package {
            import_path: entry.package_path().to_string(),
            name: entry.name.clone(),
            module,
            standard: entry.standard || entry.goroot,
            go_files: absolute(&entry.dir, entry.go_files.iter()),
            compiled_go_files: absolute(&entry.dir, entry.compiled_go_files.iter()),
            other_files: absolute(&entry.dir, entry.other_files()),
            imports: Vec::new(),
            errors: entry.error.iter().map(|e| e.err.clone()).collect(),
        });
        if !entry.dep_only {
            graph.roots.push(id);
        }
    }

    for (id, entry) in kept.into_iter().enumerate() {
        let imports = entry
            .imports
            .iter()
            .filter_map(|path| match ids.get(path) {
                Some(&dep) => Some(dep),
                None => {
                    // cgo's pseudo-package "C" never shows up as a listing.
                    tracing::debug!("{} imports unlisted package {path}", entry.import_path);
                    None
                }
            })
            .collect();
        graph.packages[id].imports = imports;
    }

    Ok(graph)
}

fn absolute<'a>(dir: &Path, files: impl Iterator<Item = &'a String>) -> Vec<PathBuf> {
    files.map(|f| dir.join(f)).collect()
}

/// Loads the graph by running `go list -e -json -deps`.
pub struct GoListLoader {
    pub go_binary: String,
    pub include_tests: bool,
    /// Directory `go list` runs in; the current directory when `None`.
    pub work_dir: Option<PathBuf>,
}

impl GoListLoader {
    pub fn new(include_tests: bool, work_dir: Option<PathBuf>) -> Self {
        Self {
            go_binary: "go".to_string(),
            include_tests,
            work_dir,
        }
    }
}

impl super::GraphLoader for GoListLoader {
    fn load(&self, import_paths: &[String]) -> Result<PackageGraph> {
        let mut cmd = Command::new(&self.go_binary);
        cmd.args(["list", "-e", "-json", "-deps"]);
        if self.include_tests {
            cmd.arg("-test");
        }
        cmd.arg("--").args(import_paths);
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!("running {:?}", cmd);
        let output = cmd
            .output()
            .with_context(|| format!("running `{} list`", self.go_binary))?;
        if !output.status.success() {
            anyhow::bail!(
                "`{} list` exited with {}: {}",
                self.go_binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8(output.stdout).context("go list output is not UTF-8")?;
        parse_stream(&stdout)
    }
}

/// Loads a graph previously captured with `go list -e -json -deps > file`.
pub struct RecordedGraph {
    pub path: PathBuf,
}

impl super::GraphLoader for RecordedGraph {
    fn load(&self, _import_paths: &[String]) -> Result<PackageGraph> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        parse_stream(&content)
    }
}
