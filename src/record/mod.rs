//! Puzzle records at each stage of the pipeline
//!
//! - `CandidateRecord`: metadata parsed from one index listing
//! - `ImageFields`: the image enrichment, applied to a stored record all at once
//! - `EnrichedRecord`: a candidate plus its image enrichment

mod difficulty;

pub use difficulty::Difficulty;

/// One puzzle discovered on the index, before enrichment
///
/// Every field is required. The listing parser never builds a partial record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateRecord {
    /// Puzzle number taken from the listing title
    pub id: i64,

    /// Publication time in milliseconds since the epoch
    pub published_at_millis: i64,

    /// Link to the puzzle's detail page, absolute or site-relative
    pub detail_url: String,

    pub difficulty: Difficulty,
}

/// Image enrichment for a stored puzzle
///
/// `image_bytes` is an opaque blob and is never indexed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFields {
    pub image_url: String,
    pub image_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Encoding name such as "PNG" or "JPEG"
    pub format: String,
}

/// A candidate record together with its image enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub record: CandidateRecord,
    pub image: ImageFields,
}

impl EnrichedRecord {
    pub fn new(record: CandidateRecord, image: ImageFields) -> Self {
        Self { record, image }
    }

    pub fn id(&self) -> i64 {
        self.record.id
    }
}
