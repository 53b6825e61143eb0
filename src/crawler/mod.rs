//! Web crawler for form and cookie discovery
//!
//! Recursive, budget-limited crawler. Each page's same-origin links are claimed
//! in the shared [`ScanContext`] before dispatch, fetched concurrently under a
//! semaphore, and joined before the page is considered done.

pub mod extractor;

use crate::context::{CrawlOutcome, ScanContext};
use crate::http::HttpClient;
use crate::models::{FetchedPage, ScanConfig};
use futures::future::{join_all, BoxFuture, FutureExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Budget-limited crawler that stays under the target URL prefix
pub struct Crawler<'a> {
    client: &'a HttpClient,
    ctx: ScanContext,
    limiter: Semaphore,
}

impl<'a> Crawler<'a> {
    pub fn new(client: &'a HttpClient, config: &ScanConfig) -> Self {
        Self {
            client,
            ctx: ScanContext::new(&config.target, config.max_pages),
            limiter: Semaphore::new(config.concurrency.max(1)),
        }
    }

    /// Crawls outward from the already-fetched initial page and returns the
    /// visited set, every form found, and the accumulated cookie jar
    pub async fn crawl(self, initial: &FetchedPage) -> CrawlOutcome {
        info!(
            "Crawling {} (budget {} pages)",
            self.ctx.target(),
            self.ctx.budget()
        );

        self.ctx.add_cookies(&initial.cookies).await;
        if self.ctx.claim(&initial.url).await {
            self.expand(initial).await;
        }

        let outcome = self.ctx.into_outcome();
        info!(
            "Crawler finished: {} URLs visited, {} forms collected",
            outcome.visited.len(),
            outcome.forms.len()
        );
        outcome
    }

    /// Records a page's forms, then visits its unclaimed in-scope links
    fn expand<'s>(&'s self, page: &'s FetchedPage) -> BoxFuture<'s, ()> {
        async move {
            let extraction = extractor::extract(page);
            debug!(
                "{}: {} forms, {} links",
                page.url,
                extraction.forms.len(),
                extraction.links.len()
            );
            self.ctx.add_forms(extraction.forms).await;

            let in_scope: Vec<String> = extraction
                .links
                .into_iter()
                .filter(|link| self.ctx.in_scope(link))
                .collect();
            let batch = self.ctx.claim_batch(in_scope).await;
            if batch.is_empty() {
                return;
            }

            join_all(batch.into_iter().map(|url| self.visit(url))).await;
        }
        .boxed()
    }

    /// Fetches a claimed link. Failures are logged and the URL stays visited.
    fn visit(&self, url: String) -> BoxFuture<'_, ()> {
        async move {
            let fetched = {
                let Ok(_permit) = self.limiter.acquire().await else {
                    warn!("Crawler limiter closed, skipping {url}");
                    return;
                };
                self.client.fetch_link(&url).await
            };

            let page = match fetched {
                Ok(page) => page,
                Err(e) => {
                    debug!("Crawler failed to fetch {url}: {e}");
                    return;
                }
            };

            self.ctx.add_cookies(&page.cookies).await;

            if !page.is_ok() {
                debug!("Not expanding {url}: status {}", page.status);
                return;
            }

            // A redirect lands on a different URL, which must be claimed too
            if page.url != url && !self.ctx.claim(&page.url).await {
                debug!("{url} redirected to already visited {}", page.url);
                return;
            }

            self.expand(&page).await;
        }
        .boxed()
    }
}
