use std::path::PathBuf;
use std::sync::Arc;

/// A versioned collection of packages rooted at one directory.
///
/// `dir` is empty when the loader lost the module's location, which in
/// practice means the code was vendored into another module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Module {
    pub path: String,
    pub version: String,
    pub dir: PathBuf,
}

/// Index of a package inside a [`PackageGraph`].
pub type PackageId = usize;

/// A compilable unit identified by its import path.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub import_path: String,
    pub name: String,
    pub module: Option<Arc<Module>>,
    /// The loader reported this package as part of the Go distribution.
    pub standard: bool,
    /// Absolute paths of the Go source files.
    pub go_files: Vec<PathBuf>,
    pub compiled_go_files: Vec<PathBuf>,
    /// Absolute paths of non-Go files (C, assembly, syso, ...).
    pub other_files: Vec<PathBuf>,
    pub imports: Vec<PackageId>,
    pub errors: Vec<String>,
}

/// Resolved import graph as produced by a [`crate::graph::GraphLoader`].
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    pub packages: Vec<Package>,
    pub roots: Vec<PackageId>,
}

impl PackageGraph {
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id]
    }

    pub fn root_packages(&self) -> impl Iterator<Item = &Package> {
        self.roots.iter().map(|&id| &self.packages[id])
    }
}
