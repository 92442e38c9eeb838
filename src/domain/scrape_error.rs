use reqwest::StatusCode;

use super::advertisement::AdField;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },
    #[error("no pager found for query `{query}`")]
    PagerNotFound { query: String },
    #[error("jump page {page} for query `{query}` has no pager")]
    JumpPagerNotFound { query: String, page: u32 },
    #[error("pager label `{label}` is not a page number")]
    InvalidPageLabel { label: String },
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("invalid url `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ScrapeError {
    pub fn is_pager_not_found(&self) -> bool {
        matches!(self, ScrapeError::PagerNotFound { .. })
    }

    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, ScrapeError::Http { .. } | ScrapeError::Status { .. })
    }
}

#[derive(Debug)]
pub enum DetailOutcome {
    Found(Vec<(AdField, String)>),
    NoData,
    Malformed {
        found: Vec<(AdField, String)>,
        missing: Vec<AdField>,
    },
    Failed(ScrapeError),
}
