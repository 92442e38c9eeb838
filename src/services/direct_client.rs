use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::{header::USER_AGENT, Client};
use url::Url;

use crate::{configuration::ScraperSettings, domain::ScrapeError};

#[async_trait]
pub trait PageFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError>;
}

pub struct DirectClient {
    client: Client,
    encoding: String,
    user_agents: Vec<String>,
}

impl DirectClient {
    pub fn new(settings: &ScraperSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(DirectClient {
            client,
            encoding: settings.encoding.clone(),
            user_agents: settings.user_agents.clone(),
        })
    }

    fn random_user_agent(&self) -> Option<String> {
        self.user_agents.choose(&mut rand::thread_rng()).cloned()
    }
}

#[async_trait]
impl PageFetcher for DirectClient {
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        let mut req = self.client.get(url.clone());
        if let Some(user_agent) = self.random_user_agent() {
            req = req.header(USER_AGENT, user_agent);
        }

        let res = req.send().await.map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }

        res.text_with_charset(&self.encoding)
            .await
            .map_err(|source| ScrapeError::Http {
                url: url.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::DirectClient;
    use crate::configuration::ScraperSettings;

    #[test]
    fn no_user_agent_when_none_configured() {
        let client = DirectClient::new(&ScraperSettings::default()).unwrap();
        assert_eq!(client.random_user_agent(), None);
    }

    #[test]
    fn picks_from_configured_user_agents() {
        let settings = ScraperSettings {
            user_agents: vec!["agent-a".to_string(), "agent-b".to_string()],
            ..Default::default()
        };
        let client = DirectClient::new(&settings).unwrap();

        let picked = client.random_user_agent().unwrap();
        assert!(settings.user_agents.contains(&picked));
    }
}
