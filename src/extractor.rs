//! Listing page extraction
//!
//! Turns one listing page into opportunity records:
//! - Locate every listing card on the page
//! - Follow each card's detail link (sequentially, in document order)
//! - Pull title and requirement chips from the detail page, location from the card
//!
//! Nothing here returns an error to the caller. Listing-level failures produce an
//! empty result with a single diagnostic; entry-level failures skip that entry.

use crate::error::SelectorError;
use crate::fetch::PageFetcher;
use crate::normalize::{collapse_whitespace, parse_listing_url, resolve_detail_url};
use crate::types::{
    DiagnosticKind, EntryDiagnostic, Extraction, OpportunityRecord, WorkMode, NOT_AVAILABLE,
};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

const REMOTE_MARKER: &str = "work from home";

/// Where each field lives in the site's markup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// One element per listing card on the listing page
    pub entry: String,
    /// Card attribute holding the relative detail-page link
    pub detail_link_attr: String,
    /// Title heading on the detail page
    pub title: String,
    /// Requirement / skill chips on the detail page
    pub requirement_chip: String,
    /// Substring of the class attribute marking the location inside a card
    pub location_class: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            entry: "div.individual_internship".to_string(),
            detail_link_attr: "data-href".to_string(),
            title: "h1".to_string(),
            requirement_chip: "span.round_tabs".to_string(),
            location_class: "location".to_string(),
        }
    }
}

struct CompiledSelectors {
    entry: Selector,
    detail_link_attr: String,
    title: Selector,
    requirement_chip: Selector,
    location: Selector,
}

impl CompiledSelectors {
    fn compile(selectors: &ListingSelectors) -> Result<Self, SelectorError> {
        let location = format!("[class*=\"{}\"]", selectors.location_class.replace('"', ""));
        Ok(Self {
            entry: compile(&selectors.entry)?,
            detail_link_attr: selectors.detail_link_attr.clone(),
            title: compile(&selectors.title)?,
            requirement_chip: compile(&selectors.requirement_chip)?,
            location: compile(&location)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// A listing card, read before its detail page is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CardEntry {
    /// 1-based, document order
    index: usize,
    detail_link: Option<String>,
    location: Option<String>,
}

/// Everything known about one entry once its detail page has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionEntry {
    pub detail_link: Option<String>,
    pub title: String,
    pub requirement_tokens: Vec<String>,
    pub location: String,
    pub mode: WorkMode,
}

impl ExtractionEntry {
    /// Apply the fallback table: a missing title or location becomes `N/A`.
    pub fn assemble(
        detail_link: Option<String>,
        title: Option<String>,
        requirement_tokens: Vec<String>,
        location: Option<String>,
    ) -> Self {
        let title = or_not_available(title);
        let mode = derive_mode(&title);
        Self {
            detail_link,
            title,
            requirement_tokens,
            location: or_not_available(location),
            mode,
        }
    }

    pub fn into_record(self) -> OpportunityRecord {
        let requirements = if self.requirement_tokens.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.requirement_tokens.join(", ")
        };

        OpportunityRecord {
            title: self.title,
            requirements,
            location: self.location,
            mode: self.mode,
        }
    }
}

/// Only remote listings are recognisable from the title; Hybrid is never derived.
pub fn derive_mode(title: &str) -> WorkMode {
    if title.to_lowercase().contains(REMOTE_MARKER) {
        WorkMode::Remote
    } else {
        WorkMode::InOffice
    }
}

fn or_not_available(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn element_text(element: &ElementRef) -> Option<String> {
    let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

type EntryOutcome = Result<OpportunityRecord, EntryDiagnostic>;

pub struct Extractor<F> {
    fetcher: F,
    selectors: CompiledSelectors,
}

impl<F: PageFetcher> Extractor<F> {
    pub fn new(fetcher: F, selectors: &ListingSelectors) -> Result<Self, SelectorError> {
        Ok(Self {
            fetcher,
            selectors: CompiledSelectors::compile(selectors)?,
        })
    }

    pub fn with_default_selectors(fetcher: F) -> Result<Self, SelectorError> {
        Self::new(fetcher, &ListingSelectors::default())
    }

    /// Fetch a listing page and assemble one record per reachable entry.
    ///
    /// Holds no state between calls.
    pub fn extract(&self, listing_url: &str) -> Extraction {
        let listing = match parse_listing_url(listing_url) {
            Ok(url) => url,
            Err(message) => {
                return self.abort(EntryDiagnostic::listing(
                    DiagnosticKind::InvalidListingUrl,
                    message,
                ));
            }
        };

        let html = match self.fetcher.fetch(listing.as_str()) {
            Ok(html) => html,
            Err(e) => {
                return self.abort(EntryDiagnostic::listing(
                    DiagnosticKind::ListingFetchFailed,
                    format!("failed to fetch listing page: {}", e),
                ));
            }
        };

        let cards = self.parse_cards(&html);
        if cards.is_empty() {
            return self.abort(EntryDiagnostic::listing(
                DiagnosticKind::NoEntries,
                format!("no entries located on {}", listing),
            ));
        }

        let total = cards.len();
        let mut extraction = Extraction::default();

        for card in cards {
            match self.process_entry(&listing, card) {
                Ok(record) => extraction.records.push(record),
                Err(diagnostic) => {
                    warn!("Skipping {}", diagnostic);
                    extraction.diagnostics.push(diagnostic);
                }
            }
        }

        info!(
            "Extracted {} of {} entries from {} ({} skipped)",
            extraction.records.len(),
            total,
            listing,
            extraction.diagnostics.len()
        );

        extraction
    }

    fn abort(&self, diagnostic: EntryDiagnostic) -> Extraction {
        warn!("{}", diagnostic);
        Extraction::failed(diagnostic)
    }

    /// Build the ordered work list from the listing markup.
    fn parse_cards(&self, html: &str) -> Vec<CardEntry> {
        let document = Html::parse_document(html);

        document
            .select(&self.selectors.entry)
            .enumerate()
            .map(|(i, card)| CardEntry {
                index: i + 1,
                detail_link: card
                    .value()
                    .attr(&self.selectors.detail_link_attr)
                    .map(str::trim)
                    .filter(|link| !link.is_empty())
                    .map(str::to_string),
                // Card-scoped: the detail page is never consulted for location
                location: card
                    .select(&self.selectors.location)
                    .next()
                    .and_then(|el| element_text(&el)),
            })
            .collect()
    }

    fn process_entry(&self, listing: &Url, card: CardEntry) -> EntryOutcome {
        let link = card.detail_link.clone().ok_or_else(|| {
            EntryDiagnostic::entry(
                DiagnosticKind::MissingDetailLink,
                card.index,
                format!("card has no '{}' attribute", self.selectors.detail_link_attr),
            )
        })?;

        let detail_url = resolve_detail_url(listing, &link).map_err(|message| {
            EntryDiagnostic::entry(DiagnosticKind::InvalidDetailLink, card.index, message)
        })?;

        let detail_html = self.fetcher.fetch(detail_url.as_str()).map_err(|e| {
            EntryDiagnostic::entry(
                DiagnosticKind::DetailFetchFailed,
                card.index,
                format!("failed to fetch detail page: {}", e),
            )
        })?;

        let entry = self.read_detail(&detail_html, card);
        debug!(
            title = %entry.title,
            requirements = ?entry.requirement_tokens,
            location = %entry.location,
            mode = %entry.mode,
            "Assembled entry from {}",
            detail_url
        );

        Ok(entry.into_record())
    }

    fn read_detail(&self, html: &str, card: CardEntry) -> ExtractionEntry {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.selectors.title)
            .next()
            .and_then(|el| element_text(&el));

        let requirement_tokens: Vec<String> = document
            .select(&self.selectors.requirement_chip)
            .filter_map(|el| element_text(&el))
            .collect();

        ExtractionEntry::assemble(card.detail_link, title, requirement_tokens, card.location)
    }
}
