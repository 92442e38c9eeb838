use std::path::PathBuf;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::{selector_table::FieldRule, AdField};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub scraper: ScraperSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ScraperSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub region_id: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub connect_timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    pub encoding: String,
    #[serde(default)]
    pub user_agents: Vec<String>,
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub queries_file: Option<PathBuf>,
    #[serde(default)]
    pub on_missing_pager: MissingPagerPolicy,
    #[serde(default)]
    pub on_listing_error: ListingErrorPolicy,
    #[serde(default)]
    pub selectors: SelectorSettings,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        ScraperSettings {
            base_url: "http://direct.yandex.ru/search".to_string(),
            region_id: 213,
            connect_timeout_secs: 3,
            timeout_secs: 5,
            encoding: "utf-8".to_string(),
            user_agents: vec![],
            queries: vec![],
            queries_file: None,
            on_missing_pager: MissingPagerPolicy::default(),
            on_listing_error: ListingErrorPolicy::default(),
            selectors: SelectorSettings::default(),
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingPagerPolicy {
    #[default]
    Fail,
    SinglePage,
    SkipQuery,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListingErrorPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SelectorSettings {
    pub pager: String,
    pub container: String,
    pub listing: Vec<FieldRule>,
    pub detail: Vec<FieldRule>,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        SelectorSettings {
            pager: "a.b-pager__page".to_string(),
            container: "div.banner-selection".to_string(),
            listing: vec![
                FieldRule::text("div.ad > div.ad-link", AdField::Title),
                FieldRule::text("div.ad > div:not(.ad-link)", AdField::Text),
                FieldRule::text("div.ad > span > span.domain", AdField::Domain),
                FieldRule::attr("div.ad > span > a.vcard", "href", AdField::Url),
            ],
            detail: vec![
                FieldRule::text("h1", AdField::Firm),
                FieldRule::text(
                    "div.contact-item.call-button-container > div.large-text",
                    AdField::Phone,
                ),
                FieldRule::text("a.email", AdField::Email),
            ],
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct OutputSettings {
    pub path: PathBuf,
    #[serde(default = "default_dedupe_empty_phones")]
    pub dedupe_empty_phones: bool,
}

fn default_dedupe_empty_phones() -> bool {
    true
}

#[derive(Deserialize, Clone, Debug)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub default_filter: String,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Failed to read current dir: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        // E.g. `APP_SCRAPER__REGION_ID=2` sets `Settings.scraper.region_id`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
