use url::Url;

use super::scrape_error::ScrapeError;

#[derive(Debug, Clone)]
pub struct SearchEndpoint {
    base: Url,
    region_id: u32,
}

impl SearchEndpoint {
    pub fn new(base_url: &str, region_id: u32) -> Result<Self, ScrapeError> {
        let base = Url::parse(base_url).map_err(|source| ScrapeError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        Ok(SearchEndpoint { base, region_id })
    }

    pub fn page_url(&self, query: &str, page: u32) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("rid", &self.region_id.to_string())
            .append_pair("text", query)
            .append_pair("page", &page.to_string());
        url
    }
}
