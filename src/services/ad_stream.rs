use std::collections::VecDeque;

use crate::{
    configuration::{ListingErrorPolicy, MissingPagerPolicy},
    domain::{AdDraft, Advertisement, DetailOutcome, ScrapeError},
};

use super::{DirectScraper, PageFetcher};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub pages_scraped: u32,
    pub pages_skipped: u32,
    pub ads: usize,
    pub detail_failures: usize,
}

enum Pages {
    Unresolved,
    UpTo(u32),
    Exhausted,
}

// Each call to `next` fetches at most one listing page and one detail page.
pub struct AdStream<'a, F> {
    scraper: &'a DirectScraper<F>,
    query: String,
    pages: Pages,
    next_page: u32,
    current_page: u32,
    pending: VecDeque<AdDraft>,
    page_size: usize,
    stats: StreamStats,
}

impl<'a, F: PageFetcher> AdStream<'a, F> {
    pub(crate) fn new(scraper: &'a DirectScraper<F>, query: &str) -> Self {
        AdStream {
            scraper,
            query: query.to_string(),
            pages: Pages::Unresolved,
            next_page: 0,
            current_page: 0,
            pending: VecDeque::new(),
            page_size: 0,
            stats: StreamStats::default(),
        }
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub async fn next(&mut self) -> Result<Option<Advertisement>, ScrapeError> {
        loop {
            if let Some(draft) = self.pending.pop_front() {
                return Ok(Some(self.finish_ad(draft).await));
            }

            let last_page = match self.pages {
                Pages::Exhausted => return Ok(None),
                Pages::UpTo(last_page) => last_page,
                Pages::Unresolved => {
                    self.pages = self.resolve_pages().await?;
                    continue;
                }
            };

            if self.next_page > last_page {
                self.pages = Pages::Exhausted;
                continue;
            }

            let page = self.next_page;
            self.current_page = page;
            match page.checked_add(1) {
                Some(next_page) => self.next_page = next_page,
                None => self.pages = Pages::Exhausted,
            }
            log::info!("`{}`: page {}/{}", self.query, page, last_page);

            match self.scraper.listing_page(&self.query, page).await {
                Ok(drafts) => {
                    self.stats.pages_scraped += 1;
                    self.page_size = drafts.len();
                    self.pending.extend(drafts);
                }
                Err(e) => match self.scraper.on_listing_error {
                    ListingErrorPolicy::Abort => return Err(e),
                    ListingErrorPolicy::Skip => {
                        log::error!("Skipping page {} of `{}`: {}", page, self.query, e);
                        self.stats.pages_skipped += 1;
                    }
                },
            }
        }
    }

    async fn resolve_pages(&mut self) -> Result<Pages, ScrapeError> {
        log::info!("Resolving page count for `{}`", self.query);

        match self.scraper.page_count(&self.query).await {
            Ok(last_page) => Ok(Pages::UpTo(last_page)),
            Err(e) if e.is_pager_not_found() => match self.scraper.on_missing_pager {
                MissingPagerPolicy::Fail => Err(e),
                MissingPagerPolicy::SinglePage => {
                    log::warn!("{}, scraping the first page only", e);
                    Ok(Pages::UpTo(0))
                }
                MissingPagerPolicy::SkipQuery => {
                    log::error!("{}, skipping query", e);
                    Ok(Pages::Exhausted)
                }
            },
            Err(e) if e.is_fetch_failure() => match self.scraper.on_listing_error {
                ListingErrorPolicy::Abort => Err(e),
                ListingErrorPolicy::Skip => {
                    log::error!("Skipping query `{}`, page count unavailable: {}", self.query, e);
                    self.stats.pages_skipped += 1;
                    Ok(Pages::Exhausted)
                }
            },
            Err(e) => Err(e),
        }
    }

    async fn finish_ad(&mut self, mut draft: AdDraft) -> Advertisement {
        self.stats.ads += 1;
        log::info!(
            "`{}`: ad {}/{} on page {}: {}",
            self.query,
            self.page_size - self.pending.len(),
            self.page_size,
            self.current_page,
            draft.title()
        );

        if let Some(link) = draft.detail_url().map(str::to_string) {
            match self.scraper.scrape_detail(&link).await {
                DetailOutcome::Found(values) => draft.merge(values),
                DetailOutcome::NoData => {
                    log::debug!("No contact data on {}", link);
                }
                DetailOutcome::Malformed { found, missing } => {
                    log::warn!("Detail page {} is missing {:?}", link, missing);
                    draft.merge(found);
                }
                DetailOutcome::Failed(e) => {
                    self.stats.detail_failures += 1;
                    log::error!("Failed to scrape detail page {}: {:#}", link, anyhow::Error::from(e));
                }
            }
        }

        draft.finish()
    }
}
