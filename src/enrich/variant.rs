//! Choosing one image source among the variants a detail page offers

use thiserror::Error;

/// One declared size/URL option for a puzzle image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageVariant {
    /// Human-readable size label, e.g. "(min-width: 660px) 620px" or "600px"
    pub declared_size: String,
    /// Source set entry: a URL optionally followed by a descriptor
    pub source_set: String,
}

impl ImageVariant {
    pub fn new(declared_size: impl Into<String>, source_set: impl Into<String>) -> Self {
        Self {
            declared_size: declared_size.into(),
            source_set: source_set.into(),
        }
    }
}

/// No usable image source on a detail page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoVariantError {
    #[error("no image sources found")]
    NoCandidates,

    #[error("image source declared as '{declared_size}' has an empty source set")]
    EmptySourceSet { declared_size: String },
}

/// Picks the image URL from the largest declared variant
///
/// Variants are ranked by comparing `declared_size` as plain strings,
/// descending. Equal sizes keep their document order. The URL is the first
/// token of the winning source set with `&amp;` unescaped.
///
/// The comparison is lexical, so "1000px" ranks below "300px".
///
/// # Examples
///
/// ```
/// use kakurizer::enrich::{select_best, ImageVariant};
///
/// let variants = vec![
///     ImageVariant::new("300px", "https://i.example.com/k.png?width=300 300w"),
///     ImageVariant::new("600px", "https://i.example.com/k.png?width=600&amp;q=85 600w"),
/// ];
/// assert_eq!(
///     select_best(&variants).unwrap(),
///     "https://i.example.com/k.png?width=600&q=85"
/// );
/// ```
pub fn select_best(variants: &[ImageVariant]) -> Result<String, NoVariantError> {
    let mut ranked: Vec<&ImageVariant> = variants.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.declared_size.cmp(&a.declared_size));

    let best = ranked.first().ok_or(NoVariantError::NoCandidates)?;
    let raw_url = best
        .source_set
        .split_whitespace()
        .next()
        .ok_or_else(|| NoVariantError::EmptySourceSet {
            declared_size: best.declared_size.clone(),
        })?;

    Ok(raw_url.replace("&amp;", "&"))
}
