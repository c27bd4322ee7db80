//! Detail page scan for image sources

use crate::enrich::variant::ImageVariant;
use crate::markup::CompiledContract;
use scraper::Html;

/// Collects every image source on a detail page, in document order
///
/// Only sources carrying a source set are returned. A source without a size
/// label gets an empty `declared_size`, which ranks last.
pub fn extract_variants(html: &str, contract: &CompiledContract) -> Vec<ImageVariant> {
    let document = Html::parse_document(html);
    let names = contract.contract();

    document
        .select(&contract.source)
        .filter_map(|source| {
            let element = source.value();
            let source_set = element.attr(&names.source_set_attribute)?;
            let declared_size = element.attr(&names.size_attribute).unwrap_or_default();
            Some(ImageVariant::new(declared_size, source_set))
        })
        .collect()
}
