//! Image loading DTOs.

use crate::domain::entities::{ImageSource, LoadedImage, ObjectUrl};
use crate::domain::errors::{CacheError, CacheResult};

/// Outcome of loading one requested URL.
#[derive(Debug, Clone)]
pub struct ImageLoadReport {
    /// Requested URL.
    pub url: String,
    /// Loaded image, or the failure shared by this attempt.
    pub outcome: CacheResult<LoadedImage>,
}

impl ImageLoadReport {
    /// Creates a report for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, outcome: CacheResult<LoadedImage>) -> Self {
        Self {
            url: url.into(),
            outcome,
        }
    }

    /// Returns true if the load succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Returns the handle if the load succeeded.
    #[must_use]
    pub fn handle(&self) -> Option<&ObjectUrl> {
        self.outcome.as_ref().ok().map(|loaded| &loaded.handle)
    }

    /// Returns where the handle came from if the load succeeded.
    #[must_use]
    pub fn source(&self) -> Option<ImageSource> {
        self.outcome.as_ref().ok().map(|loaded| loaded.source)
    }

    /// Returns the failure if the load failed.
    #[must_use]
    pub fn error(&self) -> Option<&CacheError> {
        self.outcome.as_ref().err()
    }
}

/// Summary of a batch load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Requests answered from the cache.
    pub cached: usize,
    /// Requests that shared another request's fetch.
    pub joined: usize,
    /// Requests that fetched from the network.
    pub fetched: usize,
    /// Requests that failed.
    pub failed: usize,
}

impl BatchSummary {
    /// Tallies a set of reports.
    #[must_use]
    pub fn from_reports(reports: &[ImageLoadReport]) -> Self {
        reports
            .iter()
            .fold(Self::default(), |mut summary, report| {
                match report.source() {
                    Some(ImageSource::Cache) => summary.cached += 1,
                    Some(ImageSource::InFlight) => summary.joined += 1,
                    Some(ImageSource::Network) => summary.fetched += 1,
                    None => summary.failed += 1,
                }
                summary
            })
    }
}
