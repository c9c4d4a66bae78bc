//! Event-tag frequency over a date range.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::debug;

use crate::core::article::TagCount;
use crate::core::tag_filter::TagFilter;
use crate::error::{NewsError, Result};
use crate::store::{bounded, DocumentStore};

pub struct TagAggregator {
    store: Arc<dyn DocumentStore>,
    filter: TagFilter,
    max_buckets: usize,
    timeout: Duration,
}

impl TagAggregator {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        filter: TagFilter,
        max_buckets: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            filter,
            max_buckets,
            timeout,
        }
    }

    /// The `top_n` most frequent tags among articles dated in `[start, end]`.
    ///
    /// Each article counts once per distinct tag. Ties go to the lexically
    /// smaller tag. No articles in range yields an empty list.
    pub async fn top_tags(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        top_n: usize,
    ) -> Result<Vec<TagCount>> {
        if start > end {
            return Err(NewsError::validation(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }
        if top_n == 0 {
            return Err(NewsError::validation("top_n must be a positive integer"));
        }

        // Over-fetch past top_n so noise tags don't eat into it.
        let limit = top_n.saturating_add(self.max_buckets);
        let buckets = bounded(self.timeout, self.store.tag_counts(start, end, limit)).await?;
        debug!(%start, %end, buckets = buckets.len(), "tag buckets");

        let mut counts: Vec<TagCount> = buckets
            .into_iter()
            .filter(|b| !self.filter.is_noise(&b.tag))
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        counts.truncate(top_n);
        Ok(counts)
    }
}
