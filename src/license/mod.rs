//! License text identification.
//!
//! - [`classifier`]: the [`Classifier`](classifier::Classifier) seam used by
//!   the locator and the report, plus a phrase-matching implementation.
//! - [`signatures`]: distinctive phrases per SPDX identifier.

pub mod classifier;
pub mod signatures;
