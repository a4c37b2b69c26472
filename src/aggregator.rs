//! Aggregator logic: turns per-venue feeds into one `PriceTable` snapshot.

use crate::{
    models::PriceTable,
    provider::{RetryPolicy, VenueFeed, fetch_with_retry},
};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fetch every feed concurrently (each with its own retries) and merge the
/// results. A feed that still fails after retrying contributes nothing, so the
/// table may be partial; this never fails as a whole.
pub async fn collect_price_table(feeds: &[Arc<dyn VenueFeed>], policy: &RetryPolicy) -> PriceTable {
    let fetches = feeds.iter().map(|feed| async move {
        let res = fetch_with_retry(feed.as_ref(), policy).await;
        (feed.venue().to_string(), res)
    });

    let mut rows = Vec::new();
    for (venue, res) in join_all(fetches).await {
        match res {
            Ok(quotes) => {
                debug!(venue = %venue, quotes = quotes.len(), "[FEED] quotes received");
                rows.extend(quotes.into_iter().map(|q| (q.asset, venue.clone(), q.price)));
            }
            Err(e) => {
                warn!(venue = %venue, error = %e, "[FEED] giving up on venue for this scan");
            }
        }
    }

    rows.into_iter().collect()
}
