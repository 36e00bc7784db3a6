use thiserror::Error;

/// A package together with one of its load errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFailure {
    pub import_path: String,
    pub error: String,
}

/// Conditions that abort a scan. License coverage of a broken graph cannot
/// be trusted, so no partial result is returned alongside these.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("errors loading packages:{}", format_failures(.0))]
    PackagesLoad(Vec<PackageFailure>),

    #[error(
        "packages without module info (non-module projects are not supported): {}",
        .0.join(", ")
    )]
    MissingModuleInfo(Vec<String>),
}

fn format_failures(failures: &[PackageFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("\n{}: {}", f.import_path, f.error))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packages_load_message_lists_every_failure() {
        let err = ScanError::PackagesLoad(vec![
            PackageFailure {
                import_path: "example.com/a".into(),
                error: "no Go files".into(),
            },
            PackageFailure {
                import_path: "example.com/b".into(),
                error: "import cycle".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "errors loading packages:\nexample.com/a: no Go files\nexample.com/b: import cycle"
        );
    }

    #[test]
    fn test_missing_module_message() {
        let err = ScanError::MissingModuleInfo(vec!["x".into(), "y".into()]);
        assert!(err.to_string().ends_with("x, y"));
    }
}
