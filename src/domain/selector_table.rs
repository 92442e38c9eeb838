use scraper::{ElementRef, Selector};
use serde::Deserialize;

use super::{
    advertisement::{AdField, FieldValues},
    scrape_error::ScrapeError,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSource {
    #[default]
    Text,
    Attr {
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldRule {
    pub selector: String,
    pub field: AdField,
    #[serde(default)]
    pub source: FieldSource,
    #[serde(default)]
    pub required: bool,
}

impl FieldRule {
    pub fn text(selector: &str, field: AdField) -> Self {
        FieldRule {
            selector: selector.to_string(),
            field,
            source: FieldSource::Text,
            required: false,
        }
    }

    pub fn attr(selector: &str, name: &str, field: AdField) -> Self {
        FieldRule {
            selector: selector.to_string(),
            field,
            source: FieldSource::Attr {
                name: name.to_string(),
            },
            required: false,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Extraction {
    pub values: FieldValues,
    pub missing_required: Vec<AdField>,
}

struct CompiledRule {
    selector: Selector,
    field: AdField,
    source: FieldSource,
    required: bool,
}

pub struct SelectorTable {
    rules: Vec<CompiledRule>,
}

pub fn compile_selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
        selector: css.to_string(),
        reason: format!("{:?}", e),
    })
}

impl SelectorTable {
    pub fn compile(rules: &[FieldRule]) -> Result<Self, ScrapeError> {
        let rules = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    selector: compile_selector(&rule.selector)?,
                    field: rule.field,
                    source: rule.source.clone(),
                    required: rule.required,
                })
            })
            .collect::<Result<Vec<_>, ScrapeError>>()?;

        Ok(SelectorTable { rules })
    }

    /// First match per rule wins. Unmatched optional rules contribute nothing.
    pub fn extract(&self, scope: ElementRef<'_>) -> Extraction {
        let mut extraction = Extraction::default();

        for rule in self.rules.iter() {
            let value = scope
                .select(&rule.selector)
                .next()
                .and_then(|element| match &rule.source {
                    FieldSource::Text => Some(element_text(element)),
                    FieldSource::Attr { name } => {
                        element.value().attr(name).map(|v| v.trim().to_string())
                    }
                });

            match value {
                Some(value) => extraction.values.push((rule.field, value)),
                None if rule.required => extraction.missing_required.push(rule.field),
                None => {}
            }
        }

        extraction
    }
}

pub fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::{FieldRule, SelectorTable};
    use crate::domain::advertisement::AdField;

    const AD: &str = r#"
        <div class="banner-selection">
          <div class="ad">
            <div class="ad-link">  ЖК   Северный </div>
            <span><a class="vcard" href=" http://example.com/card/1 ">Контакты</a></span>
          </div>
        </div>"#;

    #[test]
    fn extracts_text_and_attributes() {
        let table = SelectorTable::compile(&[
            FieldRule::text("div.ad > div.ad-link", AdField::Title),
            FieldRule::attr("div.ad > span > a.vcard", "href", AdField::Url),
            FieldRule::text("div.ad > span > span.domain", AdField::Domain),
        ])
        .unwrap();

        let html = Html::parse_fragment(AD);
        let extraction = table.extract(html.root_element());

        assert_eq!(
            extraction.values,
            vec![
                (AdField::Title, "ЖК Северный".to_string()),
                (AdField::Url, "http://example.com/card/1".to_string()),
            ]
        );
        assert!(extraction.missing_required.is_empty());
    }

    #[test]
    fn reports_missing_required_fields() {
        let mut phone = FieldRule::text("div.large-text", AdField::Phone);
        phone.required = true;
        let table = SelectorTable::compile(&[FieldRule::text("h1", AdField::Firm), phone]).unwrap();

        let html = Html::parse_document("<html><body><h1>ООО Ромашка</h1></body></html>");
        let extraction = table.extract(html.root_element());

        assert_eq!(extraction.values, vec![(AdField::Firm, "ООО Ромашка".to_string())]);
        assert_eq!(extraction.missing_required, vec![AdField::Phone]);
    }

    #[test]
    fn attribute_missing_on_match_counts_as_no_match() {
        let table =
            SelectorTable::compile(&[FieldRule::attr("a.vcard", "href", AdField::Url)]).unwrap();

        let html = Html::parse_fragment(r#"<a class="vcard">no link</a>"#);

        assert!(table.extract(html.root_element()).values.is_empty());
    }

    #[test]
    fn rejects_invalid_selector() {
        assert!(SelectorTable::compile(&[FieldRule::text("div[", AdField::Text)]).is_err());
    }
}
