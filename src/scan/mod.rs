//! Turning a package graph into license-sharing libraries.
//!
//! # Flow
//! 1. [`filter::filter_packages`] walks the graph and keeps the packages
//!    that need review, failing on load errors or missing module info.
//! 2. The [`LicenseLocator`] finds each package's license file.
//! 3. [`library::group_libraries`] buckets packages by license file.
//! 4. [`vendor::resolve_vendored`] fixes up libraries of vendored code.

use crate::error::ScanError;
use crate::locator::LicenseLocator;
use crate::models::PackageGraph;

pub mod filter;
pub mod library;
pub mod vendor;

pub use filter::FilterOptions;
pub use library::Library;

/// Collect the libraries used by the graph's roots, directly or transitively.
///
/// Packages not covered by a license come back as individual libraries;
/// standard library packages are left out.
pub fn libraries(
    graph: &PackageGraph,
    options: &FilterOptions,
    locator: &dyn LicenseLocator,
) -> Result<Vec<Library>, ScanError> {
    let filtered = filter::filter_packages(graph, options)?;
    tracing::debug!("{} packages need a license", filtered.len());

    let found = filtered.into_iter().map(|f| {
        let module_dir = f
            .package
            .module
            .as_deref()
            .map(|m| m.dir.as_path())
            .unwrap_or_else(|| std::path::Path::new(""));
        let license = match locator.find(&f.dir, module_dir) {
            Ok(license) => license,
            Err(err) => {
                tracing::error!("Failed to find license for {}: {err:#}", f.package.import_path);
                None
            }
        };
        (f.package, license)
    });

    let mut libraries = library::group_libraries(found);
    for lib in &mut libraries {
        vendor::resolve_vendored(lib, graph.root_packages());
    }
    // Reattribution changes no member lists, so the order still holds.
    Ok(libraries)
}
