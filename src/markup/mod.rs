//! Markup contract for the puzzle index and detail pages
//!
//! The listing and detail parsers never hard-code element lookups. Everything
//! they read from a document is named here, so a change in the site's markup
//! means editing this contract (or the `[markup]` config table) and nothing
//! else.
//!
//! # Example
//!
//! ```
//! use kakurizer::markup::{CompiledContract, MarkupContract};
//!
//! let contract = CompiledContract::compile(&MarkupContract::default()).unwrap();
//! assert_eq!(contract.version(), 1);
//! ```

use crate::ConfigError;
use scraper::Selector;
use serde::Deserialize;

/// Version of the built-in contract
pub const CONTRACT_VERSION: u32 = 1;

/// Names of the elements and attributes the parsers depend on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MarkupContract {
    pub version: u32,

    /// Element name of one listing on an index page
    pub item_element: String,

    /// Attribute that marks an item element as a puzzle listing
    pub identity_attribute: String,

    /// Element holding "<Series> <number> <difficulty>" text
    pub title_selector: String,

    /// Element carrying the publication timestamp
    pub timestamp_selector: String,

    /// Attribute holding milliseconds since the epoch
    pub timestamp_attribute: String,

    /// Link to the puzzle's detail page
    pub link_selector: String,

    pub link_attribute: String,

    /// One candidate image source on a detail page
    pub source_selector: String,

    /// Human-readable size label used to rank image sources
    pub size_attribute: String,

    /// "url descriptor" pairs for an image source
    pub source_set_attribute: String,
}

impl Default for MarkupContract {
    fn default() -> Self {
        Self {
            version: CONTRACT_VERSION,
            item_element: "section".to_string(),
            identity_attribute: "id".to_string(),
            title_selector: ".fc-item__title".to_string(),
            timestamp_selector: "time.fc-item__timestamp".to_string(),
            timestamp_attribute: "data-timestamp".to_string(),
            link_selector: "a.fc-item__link".to_string(),
            link_attribute: "href".to_string(),
            source_selector: "source".to_string(),
            size_attribute: "sizes".to_string(),
            source_set_attribute: "srcset".to_string(),
        }
    }
}

/// A contract with its selectors parsed, ready for repeated use
#[derive(Debug, Clone)]
pub struct CompiledContract {
    contract: MarkupContract,
    pub(crate) item: Selector,
    pub(crate) title: Selector,
    pub(crate) timestamp: Selector,
    pub(crate) link: Selector,
    pub(crate) source: Selector,
}

impl CompiledContract {
    /// Parses every selector in the contract
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSelector` for the first selector that does
    /// not parse, and `ConfigError::Validation` for an unsupported version or an
    /// empty attribute name.
    pub fn compile(contract: &MarkupContract) -> Result<Self, ConfigError> {
        if contract.version != CONTRACT_VERSION {
            return Err(ConfigError::Validation(format!(
                "Unsupported markup contract version {}, expected {}",
                contract.version, CONTRACT_VERSION
            )));
        }

        for (name, value) in [
            ("item-element", &contract.item_element),
            ("identity-attribute", &contract.identity_attribute),
            ("timestamp-attribute", &contract.timestamp_attribute),
            ("link-attribute", &contract.link_attribute),
            ("size-attribute", &contract.size_attribute),
            ("source-set-attribute", &contract.source_set_attribute),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "markup {} cannot be empty",
                    name
                )));
            }
        }

        if !contract
            .item_element
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConfigError::Validation(format!(
                "markup item-element must be a bare element name, got '{}'",
                contract.item_element
            )));
        }

        Ok(Self {
            item: parse_selector(&contract.item_element)?,
            title: parse_selector(&contract.title_selector)?,
            timestamp: parse_selector(&contract.timestamp_selector)?,
            link: parse_selector(&contract.link_selector)?,
            source: parse_selector(&contract.source_selector)?,
            contract: contract.clone(),
        })
    }

    pub fn version(&self) -> u32 {
        self.contract.version
    }

    pub fn contract(&self) -> &MarkupContract {
        &self.contract
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
