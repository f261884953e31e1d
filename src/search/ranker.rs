use std::time::Instant;

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, info, instrument, warn};

use super::corpus::{CorpusProvider, CorpusRecord};
use super::error::SearchError;
use super::types::{RankedMatch, SearchOptions, SearchOutcome};
use crate::embedding::EmbeddingProvider;
use crate::pipeline::{ComparisonPipeline, ImageInput, PreparedEmbedding};
use crate::scoring::ComparisonResult;

/// Scores one probe against every corpus record and keeps the best `top_k`.
///
/// The result cache is never consulted; the embedding cache is, so repeated searches
/// over an unchanged corpus only re-embed the probe if it changed.
pub struct CandidateRanker<P> {
    pipeline: ComparisonPipeline<P>,
}

impl<P> Clone for CandidateRanker<P> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
        }
    }
}

impl<P: EmbeddingProvider> CandidateRanker<P> {
    pub fn new(pipeline: ComparisonPipeline<P>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &ComparisonPipeline<P> {
        &self.pipeline
    }

    #[instrument(
        skip(self, probe, corpus, options),
        fields(probe_len = probe.bytes.len(), top_k = options.top_k)
    )]
    pub async fn search(
        &self,
        probe: &ImageInput,
        corpus: &dyn CorpusProvider,
        options: &SearchOptions,
    ) -> Result<SearchOutcome, SearchError> {
        let start = Instant::now();

        let probe_prepared = self
            .pipeline
            .prepare(probe, true)
            .await
            .map_err(SearchError::Probe)?;

        let records = corpus.records().await?;
        let searched_records = records.len();

        let pipeline = &self.pipeline;
        let probe_ref = &probe_prepared;
        let scored: Vec<(CorpusRecord, Option<ComparisonResult>)> = stream::iter(records)
            .map(|record| async move {
                let result = score_record(pipeline, probe_ref, &record).await;
                (record, result)
            })
            .buffered(options.concurrency.max(1))
            .collect()
            .await;

        let mut failed_records = 0;
        let mut candidates = Vec::with_capacity(scored.len());
        for (record, result) in scored {
            match result {
                Some(result) => candidates.push((record, result)),
                None => failed_records += 1,
            }
        }

        let matches = rank(candidates, options);

        info!(
            searched = searched_records,
            failed = failed_records,
            returned = matches.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );

        Ok(SearchOutcome {
            matches,
            probe_domain: probe_prepared.domain,
            searched_records,
            failed_records,
        })
    }
}

async fn score_record<P: EmbeddingProvider>(
    pipeline: &ComparisonPipeline<P>,
    probe: &PreparedEmbedding,
    record: &CorpusRecord,
) -> Option<ComparisonResult> {
    let start = Instant::now();
    let input = ImageInput::new(record.photo.clone());

    match pipeline.prepare(&input, true).await {
        Ok(prepared) => {
            let result = pipeline
                .score(probe, &prepared)
                .with_processing_time(start.elapsed().as_secs_f64());
            debug!(id = %record.id, similarity = result.similarity, "Record scored");
            Some(result)
        }
        Err(e) => {
            warn!(
                id = %record.id,
                filename = %record.filename,
                error = %e,
                "Skipping corpus record"
            );
            None
        }
    }
}

/// Stable sort by similarity (descending), optional floor, truncate, assign ranks.
///
/// Verified results pass the floor regardless of their similarity.
pub fn rank(
    mut candidates: Vec<(CorpusRecord, ComparisonResult)>,
    options: &SearchOptions,
) -> Vec<RankedMatch> {
    candidates.sort_by(|a, b| b.1.similarity.total_cmp(&a.1.similarity));

    candidates
        .into_iter()
        .filter(|(_, result)| {
            result.verified
                || options
                    .min_similarity
                    .is_none_or(|floor| result.similarity >= floor)
        })
        .take(options.top_k)
        .enumerate()
        .map(|(i, (record, result))| RankedMatch {
            rank: i + 1,
            record: record.reference(),
            result,
        })
        .collect()
}
