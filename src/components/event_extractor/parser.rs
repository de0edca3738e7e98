use super::models::{Event, Extraction, SkipDiagnostic, SkipReason};
use super::naming::{link_slug, NamingRules};
use crate::error::{scrape_error, SyncResult};
use crate::utils::time::parse_unix_timestamp;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

const CARD_SELECTOR: &str = "div.c-card-event--result__info";
const DATE_SELECTOR: &str = "div.c-card-event--result__date.tz-change-data";
const LINK_SELECTOR: &str = "a[href]";

const MAIN_CARD_ATTR: &str = "data-main-card-timestamp";
const EARLY_CARD_ATTR: &str = "data-early-card-timestamp";
const PRELIMS_CARD_ATTR: &str = "data-prelims-card-timestamp";

struct Selectors {
    card: Selector,
    date: Selector,
    link: Selector,
}

impl Selectors {
    fn new() -> SyncResult<Self> {
        let parse = |css: &str| {
            Selector::parse(css)
                .map_err(|e| scrape_error(&format!("Invalid selector {}: {:?}", css, e)))
        };
        Ok(Self {
            card: parse(CARD_SELECTOR)?,
            date: parse(DATE_SELECTOR)?,
            link: parse(LINK_SELECTOR)?,
        })
    }
}

/// Turns the events listing markup into event records
pub struct EventExtractor {
    base_url: Url,
    naming: NamingRules,
    selectors: Selectors,
}

impl EventExtractor {
    /// Create an extractor resolving event links against `base_url`
    pub fn new(base_url: Url) -> SyncResult<Self> {
        Ok(Self {
            base_url,
            naming: NamingRules::default(),
            selectors: Selectors::new()?,
        })
    }

    /// Extract upcoming events from `html`, skipping cards that can't be read
    pub fn extract(&self, html: &str, now: DateTime<Utc>) -> Extraction {
        let document = Html::parse_document(html);
        let mut extraction = Extraction::default();
        let mut seen_links = HashSet::new();

        for (index, card) in document.select(&self.selectors.card).enumerate() {
            match self.parse_card(card, now) {
                Ok(Some(event)) => {
                    if seen_links.insert(event.link.clone()) {
                        extraction.events.push(event);
                    } else {
                        warn!("Skipping card {}: duplicate link {}", index, event.link);
                        extraction.diagnostics.push(SkipDiagnostic {
                            index,
                            reason: SkipReason::DuplicateLink(event.link),
                        });
                    }
                }
                Ok(None) => {
                    debug!("Skipping card {}: main card already started", index);
                    extraction.past += 1;
                }
                Err(reason) => {
                    warn!("Skipping card {}: {}", index, reason);
                    extraction.diagnostics.push(SkipDiagnostic { index, reason });
                }
            }
        }

        extraction
    }

    /// Parse a single card, `Ok(None)` when it is already in the past
    fn parse_card(&self, card: ElementRef<'_>, now: DateTime<Utc>) -> Result<Option<Event>, SkipReason> {
        let date = card
            .select(&self.selectors.date)
            .next()
            .ok_or(SkipReason::MissingElement(DATE_SELECTOR))?;
        let attrs = date.value();

        let main_value = attrs.attr(MAIN_CARD_ATTR);
        let main_time = required_timestamp(main_value, MAIN_CARD_ATTR)?;
        if main_time < now {
            return Ok(None);
        }

        let prelim_time = match attrs.attr(EARLY_CARD_ATTR).filter(|v| !v.trim().is_empty()) {
            Some(early) => required_timestamp(Some(early), EARLY_CARD_ATTR)?,
            None => required_timestamp(attrs.attr(PRELIMS_CARD_ATTR), PRELIMS_CARD_ATTR)?,
        };

        let href = card
            .select(&self.selectors.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or(SkipReason::MissingLink)?;
        let link = self
            .base_url
            .join(href.trim())
            .map_err(|_| SkipReason::InvalidLink(href.to_string()))?;

        let name = self.naming.display_name(link_slug(&link));

        Event::new(name, link.to_string(), prelim_time, main_time)
            .map(Some)
            .ok_or_else(|| SkipReason::MalformedTimestamp {
                attribute: MAIN_CARD_ATTR,
                value: main_value.unwrap_or_default().to_string(),
            })
    }
}

fn required_timestamp(value: Option<&str>, attribute: &'static str) -> Result<DateTime<Utc>, SkipReason> {
    let value = value.ok_or(SkipReason::MissingAttribute(attribute))?;
    parse_unix_timestamp(value).ok_or_else(|| SkipReason::MalformedTimestamp {
        attribute,
        value: value.to_string(),
    })
}
