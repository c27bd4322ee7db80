//! Index page listing parser
//!
//! Turns one listing on an index page into a `CandidateRecord`. Each listing
//! looks roughly like:
//!
//! ```html
//! <section id="kakuro-1583">
//!   <h1 class="fc-item__title">Kakuro 1,583 medium</h1>
//!   <time class="fc-item__timestamp" data-timestamp="1513900898000"></time>
//!   <a class="fc-item__link" href="https://example.com/kakuro-1583-medium"></a>
//! </section>
//! ```
//!
//! The exact elements are named by the [`MarkupContract`](crate::markup::MarkupContract).

use crate::markup::CompiledContract;
use crate::record::{CandidateRecord, Difficulty};
use scraper::{ElementRef, Html};
use thiserror::Error;

/// A listing that could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed listing '{listing}': {reason}")]
pub struct ParseError {
    /// Identity attribute of the offending listing
    pub listing: String,
    pub reason: ParseFailure,
}

/// Why a listing failed to parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("title element not found")]
    MissingTitle,

    #[error("title element has no text")]
    EmptyTitle,

    #[error("title has no puzzle number")]
    MissingId,

    #[error("puzzle number '{0}' is not numeric")]
    NonNumericId(String),

    #[error("timestamp element not found")]
    MissingTimestampElement,

    #[error("timestamp element has no '{0}' attribute")]
    MissingTimestampAttribute(String),

    #[error("timestamp '{0}' is not numeric")]
    NonNumericTimestamp(String),

    #[error("link element not found")]
    MissingLink,

    #[error("link element has no '{0}' attribute")]
    MissingHref(String),

    #[error("title has no difficulty")]
    MissingDifficulty,

    #[error("unrecognized difficulty '{0}'")]
    UnrecognizedDifficulty(String),
}

/// Returns true if the element is a puzzle listing
///
/// A listing is an element of the contract's item type that carries the
/// identity attribute. Anything else on the page is ignored.
pub fn is_listing_item(element: &ElementRef<'_>, contract: &CompiledContract) -> bool {
    let names = contract.contract();
    element.value().name().eq_ignore_ascii_case(&names.item_element)
        && element.value().attr(&names.identity_attribute).is_some()
}

/// Parses every listing on an index page, in document order
///
/// Document order is newest first. Elements that are not listings are skipped;
/// listings that fail to parse are returned as errors in their position so the
/// caller decides whether a malformed listing is fatal.
pub fn extract_listings(
    html: &str,
    contract: &CompiledContract,
) -> Vec<Result<CandidateRecord, ParseError>> {
    let document = Html::parse_document(html);

    document
        .select(&contract.item)
        .filter(|element| is_listing_item(element, contract))
        .map(|element| parse_listing(&element, contract))
        .collect()
}

/// Parses a single listing into a record
///
/// All four fields are extracted and validated independently; the first
/// failure is returned and no partial record is ever built.
pub fn parse_listing(
    element: &ElementRef<'_>,
    contract: &CompiledContract,
) -> Result<CandidateRecord, ParseError> {
    let fail = |reason: ParseFailure| ParseError {
        listing: element
            .value()
            .attr(&contract.contract().identity_attribute)
            .unwrap_or_default()
            .to_string(),
        reason,
    };

    let title = title_text(element, contract).map_err(fail)?;
    let words: Vec<&str> = title.split_whitespace().collect();

    let id = parse_id(&words).map_err(fail)?;
    let published_at_millis = parse_timestamp(element, contract).map_err(fail)?;
    let detail_url = parse_link(element, contract).map_err(fail)?;
    let difficulty = parse_difficulty(&words).map_err(fail)?;

    Ok(CandidateRecord {
        id,
        published_at_millis,
        detail_url,
        difficulty,
    })
}

/// First non-blank text node of the title element, trimmed
fn title_text(element: &ElementRef<'_>, contract: &CompiledContract) -> Result<String, ParseFailure> {
    let title = element
        .select(&contract.title)
        .next()
        .ok_or(ParseFailure::MissingTitle)?;

    title
        .text()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(ParseFailure::EmptyTitle)
}

/// The second word of the title, with thousands separators removed
fn parse_id(words: &[&str]) -> Result<i64, ParseFailure> {
    let token = words.get(1).ok_or(ParseFailure::MissingId)?;
    token
        .replace(',', "")
        .parse::<i64>()
        .map_err(|_| ParseFailure::NonNumericId(token.to_string()))
}

fn parse_timestamp(element: &ElementRef<'_>, contract: &CompiledContract) -> Result<i64, ParseFailure> {
    let attribute = &contract.contract().timestamp_attribute;
    let time = element
        .select(&contract.timestamp)
        .next()
        .ok_or(ParseFailure::MissingTimestampElement)?;

    let value = time
        .value()
        .attr(attribute)
        .ok_or_else(|| ParseFailure::MissingTimestampAttribute(attribute.clone()))?;

    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ParseFailure::NonNumericTimestamp(value.to_string()))
}

fn parse_link(element: &ElementRef<'_>, contract: &CompiledContract) -> Result<String, ParseFailure> {
    let attribute = &contract.contract().link_attribute;
    let link = element
        .select(&contract.link)
        .next()
        .ok_or(ParseFailure::MissingLink)?;

    link.value()
        .attr(attribute)
        .map(str::to_string)
        .ok_or_else(|| ParseFailure::MissingHref(attribute.clone()))
}

/// The third word of the title: "easy", "medium" or "hard" in any case
fn parse_difficulty(words: &[&str]) -> Result<Difficulty, ParseFailure> {
    let token = words.get(2).ok_or(ParseFailure::MissingDifficulty)?;
    Difficulty::from_label(token)
        .ok_or_else(|| ParseFailure::UnrecognizedDifficulty(token.to_lowercase()))
}
