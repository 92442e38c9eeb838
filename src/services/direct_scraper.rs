use scraper::{Html, Selector};
use url::Url;

use crate::{
    configuration::{ListingErrorPolicy, MissingPagerPolicy, ScraperSettings},
    domain::{
        pager::{read_pager, PagerTail},
        search_endpoint::SearchEndpoint,
        selector_table::{compile_selector, element_text, SelectorTable},
        AdDraft, DetailOutcome, ScrapeError,
    },
};

use super::{AdStream, PageFetcher};

pub struct DirectScraper<F> {
    fetcher: F,
    endpoint: SearchEndpoint,
    pager: Selector,
    container: Selector,
    listing: SelectorTable,
    detail: SelectorTable,
    pub(crate) on_missing_pager: MissingPagerPolicy,
    pub(crate) on_listing_error: ListingErrorPolicy,
}

impl<F: PageFetcher> DirectScraper<F> {
    pub fn new(fetcher: F, settings: &ScraperSettings) -> Result<Self, ScrapeError> {
        Ok(DirectScraper {
            fetcher,
            endpoint: SearchEndpoint::new(&settings.base_url, settings.region_id)?,
            pager: compile_selector(&settings.selectors.pager)?,
            container: compile_selector(&settings.selectors.container)?,
            listing: SelectorTable::compile(&settings.selectors.listing)?,
            detail: SelectorTable::compile(&settings.selectors.detail)?,
            on_missing_pager: settings.on_missing_pager,
            on_listing_error: settings.on_listing_error,
        })
    }

    pub fn endpoint(&self) -> &SearchEndpoint {
        &self.endpoint
    }

    pub async fn page_count(&self, query: &str) -> Result<u32, ScrapeError> {
        let first_page = self.endpoint.page_url(query, 0);
        let labels = self.pager_labels(&first_page).await?;

        match read_pager(query, &labels)? {
            PagerTail::Last(count) => Ok(count),
            PagerTail::Ellipsis { jump_to } => {
                log::debug!("Pager for `{}` is truncated, jumping to page {}", query, jump_to);
                let jump_page = self.endpoint.page_url(query, jump_to);
                let labels = self.pager_labels(&jump_page).await?;
                if labels.is_empty() {
                    return Err(ScrapeError::JumpPagerNotFound {
                        query: query.to_string(),
                        page: jump_to,
                    });
                }

                match read_pager(query, &labels)? {
                    PagerTail::Last(count) => Ok(count),
                    PagerTail::Ellipsis { .. } => Err(ScrapeError::InvalidPageLabel {
                        label: crate::domain::pager::ELLIPSIS.to_string(),
                    }),
                }
            }
        }
    }

    async fn pager_labels(&self, url: &Url) -> Result<Vec<String>, ScrapeError> {
        let html = self.fetcher.fetch(url).await?;
        let document = Html::parse_document(&html);

        Ok(document.select(&self.pager).map(element_text).collect())
    }

    pub async fn listing_page(&self, query: &str, page: u32) -> Result<Vec<AdDraft>, ScrapeError> {
        let url = self.endpoint.page_url(query, page);
        let html = self.fetcher.fetch(&url).await?;

        Ok(self.parse_listing(&html))
    }

    pub fn parse_listing(&self, html: &str) -> Vec<AdDraft> {
        let document = Html::parse_document(html);

        document
            .select(&self.container)
            .map(|container| {
                let mut draft = AdDraft::default();
                draft.merge(self.listing.extract(container).values);
                draft
            })
            .collect()
    }

    pub async fn scrape_detail(&self, link: &str) -> DetailOutcome {
        let url = match self.resolve_link(link) {
            Ok(url) => url,
            Err(e) => return DetailOutcome::Failed(e),
        };

        match self.fetcher.fetch(&url).await {
            Ok(html) => self.parse_detail(&html),
            Err(e) => DetailOutcome::Failed(e),
        }
    }

    pub fn parse_detail(&self, html: &str) -> DetailOutcome {
        let document = Html::parse_document(html);
        let extraction = self.detail.extract(document.root_element());

        match (
            extraction.values.is_empty(),
            extraction.missing_required.is_empty(),
        ) {
            (_, false) => DetailOutcome::Malformed {
                found: extraction.values,
                missing: extraction.missing_required,
            },
            (true, true) => DetailOutcome::NoData,
            (false, true) => DetailOutcome::Found(extraction.values),
        }
    }

    fn resolve_link(&self, link: &str) -> Result<Url, ScrapeError> {
        let base = self.endpoint.page_url("", 0);
        base.join(link.trim()).map_err(|source| ScrapeError::InvalidUrl {
            url: link.to_string(),
            source,
        })
    }

    pub fn ads<'a>(&'a self, query: &str) -> AdStream<'a, F> {
        AdStream::new(self, query)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use url::Url;

    use super::DirectScraper;
    use crate::{
        configuration::ScraperSettings,
        domain::{pager::ELLIPSIS, AdField, DetailOutcome, ScrapeError},
        services::PageFetcher,
    };

    #[derive(Default)]
    struct CannedPages {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for CannedPages {
        async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| ScrapeError::Status {
                    url: url.to_string(),
                    status: reqwest::StatusCode::NOT_FOUND,
                })
        }
    }

    fn pager(labels: &[&str]) -> String {
        let links: String = labels
            .iter()
            .map(|l| format!(r##"<a class="b-pager__page" href="#">{}</a>"##, l))
            .collect();
        format!("<html><body><div class=\"b-pager\">{}</div></body></html>", links)
    }

    fn scraper_with(pages: Vec<(Url, String)>) -> DirectScraper<CannedPages> {
        let canned = CannedPages {
            pages: pages
                .into_iter()
                .map(|(url, html)| (url.to_string(), html))
                .collect(),
        };
        DirectScraper::new(canned, &ScraperSettings::default()).unwrap()
    }

    fn listing_url(query: &str, page: u32) -> Url {
        let settings = ScraperSettings::default();
        crate::domain::search_endpoint::SearchEndpoint::new(&settings.base_url, settings.region_id)
            .unwrap()
            .page_url(query, page)
    }

    #[tokio::test]
    async fn page_count_reads_last_label() {
        let scraper = scraper_with(vec![(listing_url("дом", 0), pager(&["1", "2", "5"]))]);

        assert_eq!(scraper.page_count("дом").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn page_count_follows_ellipsis_once() {
        let scraper = scraper_with(vec![
            (listing_url("дом", 0), pager(&["1", "2", "10", ELLIPSIS])),
            (listing_url("дом", 10), pager(&["9", "10", "11", "17"])),
        ]);

        assert_eq!(scraper.page_count("дом").await.unwrap(), 17);
    }

    #[tokio::test]
    async fn page_count_jump_page_without_pager_is_not_a_missing_pager() {
        let scraper = scraper_with(vec![
            (listing_url("дом", 0), pager(&["1", "5", ELLIPSIS])),
            (
                listing_url("дом", 5),
                "<html><body>captcha</body></html>".to_string(),
            ),
        ]);

        let err = scraper.page_count("дом").await.unwrap_err();
        assert!(!err.is_pager_not_found());
        assert!(matches!(
            err,
            ScrapeError::JumpPagerNotFound { page: 5, .. }
        ));
    }

    #[tokio::test]
    async fn page_count_without_pager_is_distinct_error() {
        let scraper = scraper_with(vec![(
            listing_url("дом", 0),
            "<html><body>ничего не найдено</body></html>".to_string(),
        )]);

        let err = scraper.page_count("дом").await.unwrap_err();
        assert!(err.is_pager_not_found());
    }

    #[tokio::test]
    async fn page_count_propagates_fetch_failure() {
        let scraper = scraper_with(vec![]);

        let err = scraper.page_count("дом").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { .. }));
    }

    #[test]
    fn parse_listing_extracts_each_container() {
        let scraper = scraper_with(vec![]);
        let html = r#"<html><body>
            <div class="banner-selection"><div class="ad">
              <div class="ad-link">Первое</div><div class="ad-text">Текст один</div>
              <span><span class="domain">one.ru</span><a class="vcard" href="/card/1">vcard</a></span>
            </div></div>
            <div class="banner-selection"><div class="ad">
              <div class="ad-link">Второе</div>
            </div></div>
        </body></html>"#;

        let drafts = scraper.parse_listing(html);

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].detail_url(), Some("/card/1"));
        assert_eq!(drafts[1].detail_url(), None);

        let first = drafts[0].clone().finish();
        assert_eq!(first.title, "Первое");
        assert_eq!(first.text, "Текст один");
        assert_eq!(first.domain, "one.ru");
        assert_eq!(drafts[1].clone().finish().domain, "");
    }

    #[test]
    fn parse_detail_classifies_outcomes() {
        let scraper = scraper_with(vec![]);

        let found = scraper.parse_detail(
            r#"<h1>ООО Ромашка</h1>
               <div class="contact-item call-button-container"><div class="large-text">+7-000-000</div></div>
               <a class="email">info@romashka.ru</a>"#,
        );
        match found {
            DetailOutcome::Found(values) => assert_eq!(
                values,
                vec![
                    (AdField::Firm, "ООО Ромашка".to_string()),
                    (AdField::Phone, "+7-000-000".to_string()),
                    (AdField::Email, "info@romashka.ru".to_string()),
                ]
            ),
            other => panic!("unexpected outcome {:?}", other),
        }

        assert!(matches!(
            scraper.parse_detail("<p>empty</p>"),
            DetailOutcome::NoData
        ));
    }

    #[tokio::test]
    async fn scrape_detail_resolves_relative_links() {
        let detail = Url::parse("http://direct.yandex.ru/card/7").unwrap();
        let scraper = scraper_with(vec![(detail, "<h1>Фирма</h1>".to_string())]);

        assert!(matches!(
            scraper.scrape_detail("/card/7").await,
            DetailOutcome::Found(_)
        ));
        assert!(matches!(
            scraper.scrape_detail("/card/8").await,
            DetailOutcome::Failed(ScrapeError::Status { .. })
        ));
    }
}
