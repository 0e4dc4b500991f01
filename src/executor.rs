use crate::harvest::extract::extract;
use crate::model::{HarvestRecord, Target};
use crate::traits::PageFetcher;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Harvests a single target: one fetch, then extraction.
///
/// Total by construction: every call yields exactly one record, and fetch
/// failures come back as error records instead of `Err`.
pub struct HarvestExecutor<F: ?Sized> {
    fetcher: Arc<F>,
}

impl<F> Clone for HarvestExecutor<F>
where
    F: ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}

impl<F> HarvestExecutor<F>
where
    F: PageFetcher + ?Sized,
{
    pub fn new(fetcher: Arc<F>) -> Self {
        Self { fetcher }
    }

    #[instrument(skip(self, target), fields(url = %target.url))]
    pub async fn execute(&self, target: Target) -> HarvestRecord {
        match self.fetcher.fetch(&target.url).await {
            Ok(body) => {
                let signals = extract(&body);
                debug!(
                    emails = signals.emails.len(),
                    stack = signals.stack_tags.len(),
                    "Harvested page"
                );
                HarvestRecord::ok(target, signals)
            }
            Err(e) => {
                debug!(error = %e, "Fetch failed");
                HarvestRecord::error(target, e.reason())
            }
        }
    }
}
