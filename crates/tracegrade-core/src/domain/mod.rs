//! Domain models for Tracegrade.
//!
//! - `ContentItem`: a reasoning trace plus the category it is scored under
//! - `ScoredItem`: the per-item score record
//! - `QualityTier` / `QualityDistribution`: tier cutoffs and histograms

pub mod error;
pub mod item;
pub mod score;

pub use error::{Result, TracegradeError};
pub use item::{load_records, ContentItem, ContentKind};
pub use score::{QualityDistribution, QualityTier, ScoredItem, PASS_THRESHOLD};
