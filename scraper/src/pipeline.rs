//! Post-scrape steps: snapshot, digest, delivery.

use chrono::NaiveDateTime;
use common::{save_snapshot, JobListing, SnapshotError};
use mailer::{DeliveryError, Digest, EmailMessage, Mailer};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a run produced before delivery.
pub struct RunOutput {
    pub snapshot: PathBuf,
    pub digest: Option<Digest>,
}

/// Saves the snapshot and, when there is anything to report, builds the digest.
pub fn prepare(
    jobs: &[JobListing],
    output_dir: &Path,
    at: NaiveDateTime,
) -> Result<RunOutput, SnapshotError> {
    let snapshot = save_snapshot(output_dir, jobs, at)?;
    info!("Total jobs found: {}", jobs.len());

    let digest = (!jobs.is_empty()).then(|| Digest::build(jobs, at.date()));
    Ok(RunOutput { snapshot, digest })
}

/// Writes the digest next to the snapshot for `--dry-run`.
pub fn write_preview(digest: &Digest, output_dir: &Path, at: NaiveDateTime) -> io::Result<PathBuf> {
    let path = output_dir.join(format!("digest_{}.html", at.format("%Y%m%d_%H%M%S")));
    fs::write(&path, &digest.html)?;
    info!(path = %path.display(), "Wrote digest preview");
    Ok(path)
}

pub fn deliver<M: Mailer>(
    mailer: &mut M,
    digest: &Digest,
    recipient: &str,
) -> Result<(), DeliveryError> {
    let message = EmailMessage::from_digest(digest, recipient);
    mailer.send(&message)
}
