use std::collections::HashSet;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::error::{PackageFailure, ScanError};
use crate::models::{Package, PackageGraph, PackageId};

/// Options controlling which packages need license review.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Whether the graph was loaded with test packages.
    pub include_tests: bool,
    /// Import-path prefixes whose packages are not reviewed themselves.
    pub ignored: Vec<String>,
    /// Root of the Go standard library (`GOROOT`).
    pub stdlib_root: Option<PathBuf>,
}

/// Classification of one graph node, decided once on first visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeClass {
    Errored,
    StdLib,
    TestBinary,
    Ignored,
    /// No files at all, nothing to look a license up for.
    Empty,
    Normal { dir: PathBuf },
}

impl NodeClass {
    /// Whether the traversal should continue into this node's imports.
    pub fn descend(&self) -> bool {
        !matches!(
            self,
            NodeClass::Errored | NodeClass::StdLib | NodeClass::TestBinary
        )
    }
}

/// A package that needs a license, with the directory to start looking in.
#[derive(Debug, Clone)]
pub struct FilteredPackage<'g> {
    pub package: &'g Package,
    pub dir: PathBuf,
}

pub fn classify(pkg: &Package, options: &FilterOptions) -> NodeClass {
    if !pkg.errors.is_empty() {
        return NodeClass::Errored;
    }
    if is_std_lib(pkg, options.stdlib_root.as_deref()) {
        return NodeClass::StdLib;
    }
    // A test binary only imports the standard library, and its directory
    // lives in the build cache rather than under its module.
    if options.include_tests && is_test_binary(pkg) {
        return NodeClass::TestBinary;
    }
    if options
        .ignored
        .iter()
        .any(|prefix| pkg.import_path.starts_with(prefix.as_str()))
    {
        return NodeClass::Ignored;
    }
    match package_dir(pkg) {
        Some(dir) => NodeClass::Normal { dir },
        None => NodeClass::Empty,
    }
}

/// Loader-flagged packages are trusted; otherwise the first Go file has to
/// sit under `stdlib_root`. `unsafe` has no Go files, so it is matched by name.
pub fn is_std_lib(pkg: &Package, stdlib_root: Option<&Path>) -> bool {
    if pkg.standard || pkg.name == "unsafe" {
        return true;
    }
    let (Some(first), Some(root)) = (pkg.go_files.first(), stdlib_root) else {
        return false;
    };
    let mut prefix = root.to_string_lossy().into_owned();
    if !prefix.ends_with(MAIN_SEPARATOR) {
        prefix.push(MAIN_SEPARATOR);
    }
    first.to_string_lossy().starts_with(&prefix)
}

pub fn is_test_binary(pkg: &Package) -> bool {
    pkg.import_path.ends_with(".test")
}

fn package_dir(pkg: &Package) -> Option<PathBuf> {
    pkg.go_files
        .first()
        .or_else(|| pkg.compiled_go_files.first())
        .or_else(|| pkg.other_files.first())
        .and_then(|f| f.parent())
        .map(Path::to_path_buf)
}

/// Fatal conditions found while walking, reported once the walk is over.
#[derive(Debug, Default)]
struct Failures {
    load_errors: Vec<PackageFailure>,
    missing_module: Vec<String>,
}

impl Failures {
    fn finish(self) -> Result<(), ScanError> {
        if !self.load_errors.is_empty() {
            return Err(ScanError::PackagesLoad(self.load_errors));
        }
        if !self.missing_module.is_empty() {
            return Err(ScanError::MissingModuleInfo(self.missing_module));
        }
        Ok(())
    }
}

/// Walk the graph from its roots and return the packages that need review,
/// in depth-first pre-order with imports visited by import path.
pub fn filter_packages<'g>(
    graph: &'g PackageGraph,
    options: &FilterOptions,
) -> Result<Vec<FilteredPackage<'g>>, ScanError> {
    let mut visited: HashSet<PackageId> = HashSet::new();
    let mut failures = Failures::default();
    let mut accepted = Vec::new();

    let mut stack: Vec<PackageId> = sorted_by_path(graph, &graph.roots);
    stack.reverse();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let pkg = graph.package(id);
        let class = classify(pkg, options);
        let mut descend = class.descend();

        match class {
            NodeClass::Errored => {
                failures
                    .load_errors
                    .extend(pkg.errors.iter().map(|e| PackageFailure {
                        import_path: pkg.import_path.clone(),
                        error: e.clone(),
                    }));
            }
            NodeClass::StdLib | NodeClass::TestBinary => {}
            NodeClass::Ignored => {
                tracing::debug!("ignoring {}", pkg.import_path);
            }
            NodeClass::Empty => {
                tracing::debug!("{} has no files", pkg.import_path);
            }
            NodeClass::Normal { dir } => {
                if !pkg.other_files.is_empty() {
                    tracing::warn!(
                        "{:?} contains non-Go code that can't be inspected for further dependencies:\n{}",
                        pkg.import_path,
                        pkg.other_files
                            .iter()
                            .map(|f| f.display().to_string())
                            .collect::<Vec<_>>()
                            .join("\n")
                    );
                }
                if pkg.module.is_none() {
                    tracing::error!("package {} does not have module info", pkg.import_path);
                    failures.missing_module.push(pkg.import_path.clone());
                    descend = false;
                } else {
                    accepted.push(FilteredPackage { package: pkg, dir });
                }
            }
        }

        if descend {
            let mut imports = sorted_by_path(graph, &pkg.imports);
            imports.reverse();
            stack.extend(imports);
        }
    }

    failures.finish()?;
    Ok(accepted)
}

fn sorted_by_path(graph: &PackageGraph, ids: &[PackageId]) -> Vec<PackageId> {
    let mut ids = ids.to_vec();
    ids.sort_by(|a, b| {
        graph
            .package(*a)
            .import_path
            .cmp(&graph.package(*b).import_path)
    });
    ids
}
