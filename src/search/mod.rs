//! Probe-vs-corpus search.

pub mod corpus;
mod error;
pub mod ranker;
pub mod types;


pub use corpus::{
    CORPUS_EXTENSIONS, CorpusProvider, CorpusRecord, DirectoryCorpus, InMemoryCorpus, RecordRef,
    is_corpus_image,
};
pub use error::{CorpusError, SearchError};
pub use ranker::{CandidateRanker, rank};
pub use types::{RankedMatch, SearchOptions, SearchOutcome, min_similarity_for_threshold};
