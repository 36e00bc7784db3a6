use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::license::classifier::Classifier;

/// File names that may hold a license.
const LICENSE_FILE_PATTERN: &str = r"^(?i)((UN)?LICEN(S|C)E|COPYING|README|NOTICE).*$";

/// Finds the license file governing a package directory.
pub trait LicenseLocator {
    /// `Ok(None)` means no license was found; callers treat errors the same
    /// way after logging them.
    fn find(&self, package_dir: &Path, module_dir: &Path) -> Result<Option<PathBuf>>;
}

/// Searches the package directory and its ancestors, up to and including
/// the module directory, for a file the classifier recognises.
///
/// When the module directory is unknown (vendored code) the search runs up
/// to the filesystem root.
pub struct FsLicenseLocator<'c> {
    classifier: &'c dyn Classifier,
    pattern: Regex,
}

impl<'c> FsLicenseLocator<'c> {
    pub fn new(classifier: &'c dyn Classifier) -> Result<Self> {
        Ok(Self {
            classifier,
            pattern: Regex::new(LICENSE_FILE_PATTERN)?,
        })
    }

    fn license_in(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).with_context(|| format!("listing {}", dir.display())),
        };

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if self.pattern.is_match(&name.to_string_lossy()) {
                candidates.push(entry.path());
            }
        }
        candidates.sort();

        for candidate in candidates {
            match self.classifier.identify(&candidate) {
                Ok(_) => return Ok(Some(candidate)),
                Err(err) => tracing::debug!("skipping {}: {err:#}", candidate.display()),
            }
        }
        Ok(None)
    }
}

impl LicenseLocator for FsLicenseLocator<'_> {
    fn find(&self, package_dir: &Path, module_dir: &Path) -> Result<Option<PathBuf>> {
        let bounded = !module_dir.as_os_str().is_empty();
        if bounded && !package_dir.starts_with(module_dir) {
            anyhow::bail!(
                "module dir {} should contain package dir {}",
                module_dir.display(),
                package_dir.display()
            );
        }

        let mut dir = Some(package_dir);
        while let Some(current) = dir {
            if let Some(found) = self.license_in(current)? {
                return Ok(Some(found));
            }
            if bounded && current == module_dir {
                break;
            }
            dir = current.parent();
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::classifier::Identification;
    use std::fs;

    /// Recognises any file whose content starts with "LICENSE:".
    struct PrefixClassifier;

    impl Classifier for PrefixClassifier {
        fn identify(&self, path: &Path) -> Result<Identification> {
            let text = fs::read_to_string(path)?;
            match text.strip_prefix("LICENSE:") {
                Some(name) => Ok(Identification {
                    name: name.trim().to_string(),
                    confidence: 1.0,
                }),
                None => anyhow::bail!("not a license"),
            }
        }
    }

    #[test]
    fn test_finds_license_in_ancestor_within_module() {
        let tmp = tempfile::tempdir().unwrap();
        let module = tmp.path().join("m");
        let pkg = module.join("a").join("b");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(module.join("LICENSE"), "LICENSE: MIT").unwrap();
        // Matches the name pattern but is not a license.
        fs::write(module.join("a").join("README.md"), "hello").unwrap();

        let locator = FsLicenseLocator::new(&PrefixClassifier).unwrap();
        let found = locator.find(&pkg, &module).unwrap();
        assert_eq!(found, Some(module.join("LICENSE")));
    }

    #[test]
    fn test_stops_at_module_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let module = tmp.path().join("m");
        fs::create_dir_all(&module).unwrap();
        fs::write(tmp.path().join("LICENSE"), "LICENSE: MIT").unwrap();

        let locator = FsLicenseLocator::new(&PrefixClassifier).unwrap();
        assert_eq!(locator.find(&module, &module).unwrap(), None);
    }

    #[test]
    fn test_unbounded_search_for_vendored_code() {
        let tmp = tempfile::tempdir().unwrap();
        let parent = tmp.path().join("parent");
        let vendored = parent.join("vendor").join("example.com").join("lib");
        fs::create_dir_all(vendored.join("sub")).unwrap();
        fs::write(vendored.join("COPYING"), "LICENSE: GPL-3.0").unwrap();

        let locator = FsLicenseLocator::new(&PrefixClassifier).unwrap();
        let found = locator.find(&vendored.join("sub"), Path::new("")).unwrap();
        assert_eq!(found, Some(vendored.join("COPYING")));
    }

    #[test]
    fn test_package_outside_module_is_an_error() {
        let locator = FsLicenseLocator::new(&PrefixClassifier).unwrap();
        assert!(locator
            .find(Path::new("/cache/x"), Path::new("/src/m"))
            .is_err());
    }
}
