use reldb_release::ReleaseRecord;
use std::collections::BTreeSet;

/// Everything known about one game between runs.
///
/// A tag is in exactly one of processed, failed or not-yet-seen; the
/// mutators keep it that way. Every release in `releases` has its tag in
/// `processed`, and no two releases share a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryCacheState {
    processed: BTreeSet<String>,
    failed: BTreeSet<String>,
    releases: Vec<ReleaseRecord>,
}
impl RepositoryCacheState {
    /// Assemble state read from storage, repairing what a partially written
    /// database can leave behind.
    pub fn from_parts(processed: BTreeSet<String>, mut failed: BTreeSet<String>, releases: Vec<ReleaseRecord>) -> Self {
        let overlap: Vec<String> = failed.intersection(&processed).cloned().collect();
        if !overlap.is_empty() {
            tracing::warn!(tags = ?overlap, "Tags recorded as both processed and failed, keeping them as processed");
            for tag in &overlap {
                failed.remove(tag);
            }
        }
        let mut state = Self {
            processed,
            failed,
            releases: Vec::with_capacity(releases.len()),
        };
        for release in releases {
            // Releases are always written before processed tags, so a release
            // whose tag never made it into `processed` is still a real release.
            let tag = release.tag_name.clone();
            if !state.record_release(release) {
                tracing::warn!(tag = %tag, "Dropping duplicate release record");
            }
        }
        state
    }

    pub fn processed(&self) -> &BTreeSet<String> {
        &self.processed
    }

    pub fn failed(&self) -> &BTreeSet<String> {
        &self.failed
    }

    pub fn releases(&self) -> &[ReleaseRecord] {
        &self.releases
    }

    pub fn is_known(&self, tag: &str) -> bool {
        self.processed.contains(tag) || self.failed.contains(tag)
    }

    /// Candidates that are neither processed nor failed, in the given order.
    pub fn unseen<'a, S: AsRef<str>>(&self, candidates: &'a [S]) -> Vec<&'a str> {
        candidates.iter().map(AsRef::as_ref).filter(|tag| !self.is_known(tag)).collect()
    }

    /// Append a freshly resolved release and mark its tag processed.
    /// Returns `false` (and changes nothing) if the tag already has a release.
    pub fn record_release(&mut self, release: ReleaseRecord) -> bool {
        if self.releases.iter().any(|existing| existing.tag_name == release.tag_name) {
            return false;
        }
        self.failed.remove(&release.tag_name);
        self.processed.insert(release.tag_name.clone());
        self.releases.push(release);
        true
    }

    /// Mark a tag as having no release. Returns `false` if the tag was already
    /// known either way.
    pub fn record_failed(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.processed.contains(&tag) {
            return false;
        }
        self.failed.insert(tag)
    }
}
