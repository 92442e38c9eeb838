use serde::{Deserialize, Serialize};

pub const CSV_HEADER: [&str; 6] = ["firm", "phone", "email", "title", "text", "domain"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advertisement {
    pub firm: String,
    pub phone: String,
    pub email: String,
    pub title: String,
    pub text: String,
    pub domain: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdField {
    Firm,
    Phone,
    Email,
    Title,
    Text,
    Domain,
    /// Link to the detail page. Never written to the output.
    Url,
}

pub type FieldValues = Vec<(AdField, String)>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdDraft {
    ad: Advertisement,
    url: Option<String>,
}

impl AdDraft {
    pub fn set(&mut self, field: AdField, value: String) {
        match field {
            AdField::Firm => self.ad.firm = value,
            AdField::Phone => self.ad.phone = value,
            AdField::Email => self.ad.email = value,
            AdField::Title => self.ad.title = value,
            AdField::Text => self.ad.text = value,
            AdField::Domain => self.ad.domain = value,
            AdField::Url => self.url = Some(value),
        }
    }

    pub fn merge(&mut self, values: FieldValues) {
        for (field, value) in values {
            self.set(field, value);
        }
    }

    pub fn detail_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn title(&self) -> &str {
        &self.ad.title
    }

    pub fn finish(self) -> Advertisement {
        self.ad
    }
}
