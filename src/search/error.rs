use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::ComparisonError;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus directory {path:?} unreadable: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("probe image could not be prepared: {0}")]
    Probe(#[source] ComparisonError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),
}
