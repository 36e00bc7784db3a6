use std::path::Path;

use anyhow::{Context, Result};

use crate::license::signatures::{normalize_text, SIGNATURES};

/// Result of identifying a license file.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    /// SPDX identifier of the best match.
    pub name: String,
    /// Share of the license's signature phrases found, in `0.0..=1.0`.
    pub confidence: f64,
}

/// Maps a file to the license it contains.
pub trait Classifier {
    /// Fails when the file can't be read or holds no recognisable license.
    fn identify(&self, path: &Path) -> Result<Identification>;
}

/// Identifies licenses by looking for each license's signature phrases.
pub struct PhraseClassifier {
    threshold: f64,
}

impl PhraseClassifier {
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("confidence threshold must be between 0 and 1, got {threshold}");
        }
        Ok(Self { threshold })
    }

    /// Best match for already-loaded text, ignoring the threshold.
    ///
    /// Ties go to the signature with more phrases, so BSD-3-Clause text is
    /// not reported as BSD-2-Clause.
    pub fn best_match(&self, text: &str) -> Option<Identification> {
        let text = normalize_text(text);
        SIGNATURES
            .iter()
            .map(|sig| {
                let found = sig.phrases.iter().filter(|p| text.contains(*p)).count();
                (sig, found as f64 / sig.phrases.len() as f64)
            })
            .filter(|(_, confidence)| *confidence > 0.0)
            .max_by(|(a, ca), (b, cb)| {
                ca.total_cmp(cb)
                    .then_with(|| a.phrases.len().cmp(&b.phrases.len()))
            })
            .map(|(sig, confidence)| Identification {
                name: sig.spdx_id.to_string(),
                confidence,
            })
    }
}

impl Classifier for PhraseClassifier {
    fn identify(&self, path: &Path) -> Result<Identification> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        match self.best_match(&text) {
            Some(id) if id.confidence >= self.threshold => Ok(id),
            Some(id) => anyhow::bail!(
                "{}: best match {} at confidence {:.2} is below threshold {:.2}",
                path.display(),
                id.name,
                id.confidence,
                self.threshold
            ),
            None => anyhow::bail!("{}: no license found", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MIT: &str = "MIT License\n\nCopyright (c) 2020 Someone\n\n\
Permission is hereby granted, free of charge, to any person obtaining a copy\n\
of this software and associated documentation files (the \"Software\"), to deal\n\
in the Software without restriction.\n\n\
The above copyright notice and this permission notice shall be included in all\n\
copies or substantial portions of the Software.\n\n\
THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR\n\
IMPLIED.\n";

    const BSD3: &str = "Redistribution and use in source and binary forms, with or without\n\
modification, are permitted provided that the following conditions are met:\n\
   * Redistributions of source code must retain the above copyright\n\
notice, this list of conditions and the following disclaimer.\n\
   * Redistributions in binary form must reproduce the above\n\
copyright notice, this list of conditions and the following disclaimer.\n\
   * Neither the name of Google Inc. nor the names of its\n\
contributors may be used to endorse or promote products.\n";

    fn file_with(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", content).unwrap();
        f
    }

    #[test]
    fn test_identifies_mit() {
        let classifier = PhraseClassifier::new(0.9).unwrap();
        let f = file_with(MIT);
        let id = classifier.identify(f.path()).unwrap();
        assert_eq!(id.name, "MIT");
        assert_eq!(id.confidence, 1.0);
    }

    #[test]
    fn test_bsd3_beats_bsd2() {
        let classifier = PhraseClassifier::new(0.9).unwrap();
        assert_eq!(classifier.best_match(BSD3).unwrap().name, "BSD-3-Clause");
    }

    #[test]
    fn test_readme_without_license_is_rejected() {
        let classifier = PhraseClassifier::new(0.9).unwrap();
        let f = file_with("# my project\n\nRun `make` to build.\n");
        assert!(classifier.identify(f.path()).is_err());
    }

    #[test]
    fn test_partial_match_below_threshold() {
        let classifier = PhraseClassifier::new(0.9).unwrap();
        let f = file_with("Licensed under the Apache License, Version 2.0.");
        let err = classifier.identify(f.path()).unwrap_err();
        assert!(err.to_string().contains("Apache-2.0"));
    }

    #[test]
    fn test_threshold_range_checked() {
        assert!(PhraseClassifier::new(1.5).is_err());
    }
}
