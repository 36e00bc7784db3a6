//! Report rows for scanned libraries and their renderers.
//!
//! - [`build_report`] identifies each library's license and links its
//!   license file, degrading to [`UNKNOWN`] wherever that fails.
//! - [`terminal`]: colored table with a summary box; respects `--quiet`.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::license::classifier::Classifier;
use crate::scan::Library;
use crate::source::SourceHost;

pub mod terminal;

pub const UNKNOWN: &str = "Unknown";

/// One report line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryReport {
    pub name: String,
    pub version: String,
    pub license_name: String,
    pub license_url: String,
    pub license_path: Option<String>,
    /// Module the library is attributed to.
    pub module: Option<String>,
    pub packages: Vec<String>,
}

impl LibraryReport {
    pub fn has_unknown_license(&self) -> bool {
        self.license_name == UNKNOWN
    }
}

/// Build report rows, one per library, in library order.
///
/// License URLs are only resolved when a `host` is given. Failures are
/// logged and leave the affected field as [`UNKNOWN`].
pub async fn build_report(
    libraries: &[Library],
    classifier: &dyn Classifier,
    host: Option<&dyn SourceHost>,
    show_progress: bool,
) -> anyhow::Result<Vec<LibraryReport>> {
    let pb = if show_progress {
        let pb = ProgressBar::new(libraries.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut rows = Vec::with_capacity(libraries.len());
    for lib in libraries {
        let mut row = LibraryReport {
            name: lib.name(),
            version: match lib.version() {
                "" => UNKNOWN.to_string(),
                v => v.to_string(),
            },
            license_name: UNKNOWN.to_string(),
            license_url: UNKNOWN.to_string(),
            license_path: lib
                .license_path
                .as_ref()
                .map(|p| p.display().to_string()),
            module: lib.module().map(|m| m.path.clone()),
            packages: lib.packages.clone(),
        };

        if let Some(license_path) = &lib.license_path {
            match classifier.identify(license_path) {
                Ok(id) => row.license_name = id.name,
                Err(err) => tracing::error!(
                    "Error identifying license in {}: {err:#}",
                    license_path.display()
                ),
            }
            if let Some(host) = host {
                if let Some(pb) = &pb {
                    pb.set_message(row.name.clone());
                }
                match lib.file_url(host, license_path).await {
                    Ok(url) => row.license_url = url,
                    Err(err) => tracing::warn!("Error discovering license URL: {err:#}"),
                }
            }
        }

        rows.push(row);
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(rows)
}
