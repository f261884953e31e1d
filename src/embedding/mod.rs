//! Face embedding providers.
//!
//! - [`provider`] defines the [`EmbeddingProvider`] seam the pipeline is generic over.
//! - [`embedder`] is the production provider (remote service or deterministic stub).

pub mod config;
pub mod embedder;
mod error;
pub mod provider;

#[cfg(any(test, feature = "mock"))]
mod mock;


pub use config::{DEFAULT_EMBEDDING_TIMEOUT, EmbedderConfig};
pub use embedder::{ImageEmbedder, stub_embedding};
pub use error::EmbeddingError;
pub use provider::{EmbeddingProvider, EmbeddingVector};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbeddingProvider;
