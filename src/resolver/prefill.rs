//! Draft pre-filling with last-lookup-wins semantics.
//!
//! Each lookup takes a generation number when it starts. When it
//! finishes, its result is applied only if no newer lookup has started
//! since, so a slow lookup for an old link can never overwrite the
//! result for the link the admin typed last.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use super::{LinkResolver, ResolveError};
use crate::adapters::MetadataFetcher;
use crate::domain::{LinkMetadata, ResourceDraft};

/// Shown when a lookup fails; the draft is left as it was
pub const MANUAL_ENTRY_MESSAGE: &str = "Could not fetch link details. Please enter them manually.";

/// What happened to the draft
#[derive(Debug, Clone, PartialEq)]
pub enum PrefillOutcome {
    /// Metadata was written into the draft
    Applied(LinkMetadata),
    /// Nothing to fill (blank, unrecognized or unknown link)
    NoMetadata,
    /// Lookup failed; draft untouched
    Failed { message: String },
    /// A newer lookup started first; result discarded
    Stale,
}

/// Finished lookup waiting to be committed
#[derive(Debug)]
pub struct PendingPrefill {
    generation: u64,
    link: String,
    result: Result<Option<LinkMetadata>, ResolveError>,
}

impl PendingPrefill {
    pub fn link(&self) -> &str {
        &self.link
    }
}

/// Link lookups for one draft
#[derive(Debug)]
pub struct LinkPrefill<F> {
    resolver: LinkResolver<F>,
    generation: AtomicU64,
}

impl<F: MetadataFetcher> LinkPrefill<F> {
    pub fn new(resolver: LinkResolver<F>) -> Self {
        Self {
            resolver,
            generation: AtomicU64::new(0),
        }
    }

    /// Generation of the most recently started lookup
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Start a lookup for `link` and wait for it.
    ///
    /// Starting supersedes every earlier lookup, finished or not.
    pub async fn lookup(&self, link: &str) -> PendingPrefill {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.resolver.resolve(link).await;

        PendingPrefill {
            generation,
            link: link.to_string(),
            result,
        }
    }

    /// Apply a finished lookup to the draft if it is still the latest
    pub fn commit(&self, pending: PendingPrefill, draft: &mut ResourceDraft) -> PrefillOutcome {
        if pending.generation != self.current_generation() {
            return PrefillOutcome::Stale;
        }

        match pending.result {
            Ok(Some(metadata)) => {
                draft.apply_metadata(&metadata);
                PrefillOutcome::Applied(metadata)
            }
            Ok(None) => PrefillOutcome::NoMetadata,
            Err(e) => {
                warn!(link = %pending.link, error = %e, "Link metadata lookup failed");
                PrefillOutcome::Failed {
                    message: MANUAL_ENTRY_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Lookup and commit in one step
    pub async fn prefill(&self, draft: &mut ResourceDraft) -> PrefillOutcome {
        let link = draft.external_link.clone();
        let pending = self.lookup(&link).await;
        self.commit(pending, draft)
    }
}
