use crate::models::Package;
use crate::scan::library::Library;

const VENDOR_SEGMENT: &str = "/vendor/";

/// What [`resolve_vendored`] did to a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorOutcome {
    /// The library's module info is complete (or absent), or it has no
    /// license file to go by; nothing to do.
    NotApplicable,
    /// Module dir is missing but the license is not under a vendor directory.
    NotVendored,
    /// No root package lives in the module that vendors this code.
    ParentNotFound { parent_dir: String },
    /// The library now belongs to the vendoring parent module.
    Reattributed { parent: String },
}

/// Attribute vendored code to the module that vendors it.
///
/// Vendored packages keep their module path but lose its directory. A
/// library in that state whose license sits under `<dir>/vendor/...` is
/// reassigned to the root package module living at `<dir>`. This is a
/// heuristic: both signals have to line up, and anything ambiguous leaves
/// the module untouched with a warning.
pub fn resolve_vendored<'g>(
    library: &mut Library,
    roots: impl IntoIterator<Item = &'g Package>,
) -> VendorOutcome {
    let Some(module) = library.module.as_deref() else {
        return VendorOutcome::NotApplicable;
    };
    if module.path.is_empty() || !module.dir.as_os_str().is_empty() {
        return VendorOutcome::NotApplicable;
    }

    let Some(license_path) = library.license_path.as_deref() else {
        return VendorOutcome::NotApplicable;
    };
    let license_path = license_path.to_string_lossy();
    let Some((parent_dir, _)) = license_path.split_once(VENDOR_SEGMENT) else {
        tracing::warn!(
            "module {} does not have dir and it's not vendored, cannot discover the license URL",
            module.path
        );
        return VendorOutcome::NotVendored;
    };

    let parent = roots
        .into_iter()
        .filter_map(|p| p.module.as_ref())
        .find(|m| m.dir.as_os_str() == std::ffi::OsStr::new(parent_dir))
        .cloned();
    match parent {
        Some(parent) => {
            tracing::debug!(
                "vendored module {} attributed to {}",
                module.path,
                parent.path
            );
            let outcome = VendorOutcome::Reattributed {
                parent: parent.path.clone(),
            };
            library.module = Some(parent);
            outcome
        }
        None => {
            tracing::warn!(
                "cannot find parent package of vendored module {}",
                module.path
            );
            VendorOutcome::ParentNotFound {
                parent_dir: parent_dir.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::filter::tests::{module, package};
    use std::path::PathBuf;

    fn vendored_library(license: &str) -> Library {
        Library {
            license_path: Some(PathBuf::from(license)),
            packages: vec!["github.com/dep/lib".into()],
            module: Some(module("github.com/dep/lib", "v1.0.0", "")),
        }
    }

    #[test]
    fn test_reattributed_to_parent_module() {
        let parent = module("example.com/app", "", "/src/app");
        let root = package("example.com/app", "/src/app/main.go", Some(&parent));
        let mut lib = vendored_library("/src/app/vendor/github.com/dep/lib/LICENSE");

        let outcome = resolve_vendored(&mut lib, [&root]);
        assert_eq!(
            outcome,
            VendorOutcome::Reattributed {
                parent: "example.com/app".into()
            }
        );
        assert_eq!(lib.module(), Some(&*parent));
    }

    #[test]
    fn test_parent_not_found_leaves_module() {
        let other = module("example.com/other", "", "/src/other");
        let root = package("example.com/other", "/src/other/main.go", Some(&other));
        let mut lib = vendored_library("/src/app/vendor/github.com/dep/lib/LICENSE");

        let outcome = resolve_vendored(&mut lib, [&root]);
        assert_eq!(
            outcome,
            VendorOutcome::ParentNotFound {
                parent_dir: "/src/app".into()
            }
        );
        assert_eq!(lib.module().unwrap().path, "github.com/dep/lib");
    }

    #[test]
    fn test_no_vendor_segment() {
        let mut lib = vendored_library("/src/app/third_party/lib/LICENSE");
        assert_eq!(
            resolve_vendored(&mut lib, std::iter::empty()),
            VendorOutcome::NotVendored
        );
        assert_eq!(lib.module().unwrap().path, "github.com/dep/lib");
    }

    #[test]
    fn test_complete_module_untouched() {
        let parent = module("example.com/app", "", "/src/app");
        let root = package("example.com/app", "/src/app/main.go", Some(&parent));
        let mut lib = vendored_library("/src/app/vendor/github.com/dep/lib/LICENSE");
        lib.module = Some(module("github.com/dep/lib", "v1.0.0", "/mod/dep"));

        assert_eq!(resolve_vendored(&mut lib, [&root]), VendorOutcome::NotApplicable);
        assert_eq!(lib.module().unwrap().path, "github.com/dep/lib");

        lib.module = None;
        assert_eq!(resolve_vendored(&mut lib, [&root]), VendorOutcome::NotApplicable);
    }

    #[test]
    fn test_unlicensed_library_is_not_checked() {
        let parent = module("example.com/app", "", "/src/app");
        let root = package("example.com/app", "/src/app/main.go", Some(&parent));
        let mut lib = vendored_library("");
        lib.license_path = None;

        assert_eq!(resolve_vendored(&mut lib, [&root]), VendorOutcome::NotApplicable);
        assert_eq!(lib.module().unwrap().path, "github.com/dep/lib");
    }
}
