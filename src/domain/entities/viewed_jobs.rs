//! Session record of job listings the user has opened.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

/// Identifier of a job listing on the remote API.
pub type JobId = u64;

/// Jobs the user has opened during this session.
#[derive(Debug, Clone, Default)]
pub struct ViewedJobs {
    inner: Arc<RwLock<ViewedJobsInner>>,
}

#[derive(Debug, Default)]
struct ViewedJobsInner {
    order: Vec<JobId>,
    seen: HashSet<JobId>,
}

impl ViewedJobs {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `job_id` as viewed. Repeated calls keep the first position.
    pub fn mark_as_viewed(&self, job_id: JobId) {
        let mut inner = self.inner.write();
        if inner.seen.insert(job_id) {
            inner.order.push(job_id);
        }
    }

    /// Returns true if `job_id` was opened this session.
    #[must_use]
    pub fn is_viewed(&self, job_id: JobId) -> bool {
        self.inner.read().seen.contains(&job_id)
    }

    /// Returns viewed ids in the order they were first opened.
    #[must_use]
    pub fn viewed_jobs(&self) -> Vec<JobId> {
        self.inner.read().order.clone()
    }

    /// Returns the number of distinct jobs viewed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// Returns true if nothing was viewed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every viewed job.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.order.clear();
        inner.seen.clear();
    }
}
