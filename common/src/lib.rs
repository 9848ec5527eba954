use serde::{Deserialize, Serialize};

pub mod sample;
pub mod snapshot;

pub use sample::sample_jobs;
pub use snapshot::{load_snapshot, save_snapshot, snapshot_file_name, SnapshotError};

/// One job posting pulled from a source page.
///
/// No uniqueness is enforced: the same posting may appear under several
/// sources or in consecutive runs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub date_posted: Option<String>,
    pub experience_level: Option<String>,
    /// Site or institution the listing came from; the digest groups on it.
    pub source: String,
}
