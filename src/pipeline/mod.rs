//! Pairwise comparison.
//!
//! [`ComparisonPipeline`] ties the image stages, the provider and the caches together.
//! [`compare`](ComparisonPipeline::compare) never fails; it reports failures as a
//! sentinel result so a caller can always render something.

pub mod comparison;
mod error;
pub mod types;


pub use comparison::ComparisonPipeline;
pub use error::ComparisonError;
pub use types::{ImageInput, PreparedEmbedding};
