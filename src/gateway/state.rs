use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::pipeline::ComparisonPipeline;
use crate::search::{CandidateRanker, CorpusProvider, SearchOptions};

pub struct HandlerState<P: EmbeddingProvider + 'static> {
    pub pipeline: ComparisonPipeline<P>,

    pub ranker: CandidateRanker<P>,

    pub corpus: Arc<dyn CorpusProvider>,

    /// Applied to `/api/search` fields the request leaves out.
    pub search_defaults: SearchOptions,
}

impl<P: EmbeddingProvider + 'static> Clone for HandlerState<P> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            ranker: self.ranker.clone(),
            corpus: Arc::clone(&self.corpus),
            search_defaults: self.search_defaults,
        }
    }
}

impl<P: EmbeddingProvider + 'static> HandlerState<P> {
    pub fn new(
        pipeline: ComparisonPipeline<P>,
        corpus: Arc<dyn CorpusProvider>,
        search_defaults: SearchOptions,
    ) -> Self {
        Self {
            ranker: CandidateRanker::new(pipeline.clone()),
            pipeline,
            corpus,
            search_defaults,
        }
    }
}
