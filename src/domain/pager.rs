use super::scrape_error::ScrapeError;

pub const ELLIPSIS: &str = "\u{2026}";

#[derive(Debug, PartialEq, Eq)]
pub enum PagerTail {
    Last(u32),
    /// The pager is truncated; `jump_to` is the label right before the ellipsis.
    Ellipsis { jump_to: u32 },
}

pub fn read_pager(query: &str, labels: &[String]) -> Result<PagerTail, ScrapeError> {
    let Some(last) = labels.last().map(|label| label.trim()) else {
        return Err(ScrapeError::PagerNotFound {
            query: query.to_string(),
        });
    };

    match last == ELLIPSIS {
        true => {
            let before = labels
                .len()
                .checked_sub(2)
                .and_then(|i| labels.get(i))
                .ok_or_else(|| ScrapeError::InvalidPageLabel {
                    label: last.to_string(),
                })?;
            Ok(PagerTail::Ellipsis {
                jump_to: parse_label(before)?,
            })
        }
        false => Ok(PagerTail::Last(parse_label(last)?)),
    }
}

pub fn parse_label(label: &str) -> Result<u32, ScrapeError> {
    label
        .trim()
        .parse::<u32>()
        .map_err(|_| ScrapeError::InvalidPageLabel {
            label: label.to_string(),
        })
}
