//! Integration tests for comparison, caching and ranking through the public API.

mod common;

use std::sync::Arc;

use common::fixtures::{angled, mock_pipeline, photo_png, sketch_png};
use facefind::{
    CACHE_MAX_SIZE, CandidateRanker, ComparisonCaches, ComparisonPipeline, ConfidenceLevel,
    CorpusRecord, EmbedderConfig, FifoCache, ImageDomain, ImageEmbedder, ImageInput,
    InMemoryCorpus, MockEmbeddingProvider, SearchOptions, classify_confidence, cosine_similarity,
};

#[tokio::test]
async fn test_uncached_comparison_is_bit_identical() {
    let embedder = ImageEmbedder::load(EmbedderConfig::stub()).unwrap();
    let pipeline =
        ComparisonPipeline::new(Arc::new(embedder), Arc::new(ComparisonCaches::default()));
    let sketch = ImageInput::new(sketch_png(12));
    let photo = ImageInput::new(photo_png(0));

    let first = pipeline.compare_with(&sketch, &photo, false).await;
    assert!(first.error.is_none(), "{:?}", first.error);

    for _ in 0..10 {
        let next = pipeline.compare_with(&sketch, &photo, false).await;
        assert_eq!(next.distance.to_bits(), first.distance.to_bits());
        assert_eq!(next.similarity.to_bits(), first.similarity.to_bits());
        assert!(!next.from_cache);
    }

    let stats = pipeline.caches().stats();
    assert_eq!(stats.embedding_cache_size, 0);
    assert_eq!(stats.result_cache_size, 0);
}

#[tokio::test]
async fn test_real_images_compare_across_domains() {
    let embedder = ImageEmbedder::load(EmbedderConfig::stub()).unwrap();
    let pipeline =
        ComparisonPipeline::new(Arc::new(embedder), Arc::new(ComparisonCaches::default()));

    let result = pipeline
        .compare(
            &ImageInput::new(sketch_png(12)),
            &ImageInput::new(photo_png(0)),
        )
        .await;

    assert!(result.is_cross_domain);
    assert_eq!(result.probe_domain, Some(ImageDomain::Sketch));
    assert_eq!(result.reference_domain, Some(ImageDomain::Photo));
    assert!((0.0..=1.0).contains(&result.similarity));
    assert!((result.distance - (1.0 - result.similarity)).abs() < 1e-12);
}

#[tokio::test]
async fn test_second_comparison_comes_from_cache() {
    let mock = MockEmbeddingProvider::new()
        .with_vector(b"left", angled(10.0))
        .with_vector(b"right", angled(50.0));
    let pipeline = mock_pipeline(mock.clone(), 8);
    let left = ImageInput::new(b"left".to_vec());
    let right = ImageInput::new(b"right".to_vec());

    let first = pipeline.compare(&left, &right).await;
    let second = pipeline.compare(&left, &right).await;

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.similarity, second.similarity);
    assert_eq!(first.distance, second.distance);
    assert_eq!(first.confidence_level, second.confidence_level);
    assert_eq!(mock.calls(), 2);
}

#[test]
fn test_zero_vector_has_zero_similarity() {
    assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &[0.3, 0.1, 0.9]), 0.0);
    assert_eq!(cosine_similarity(&[0.3, 0.1, 0.9], &[0.0, 0.0, 0.0]), 0.0);
}

#[test]
fn test_overflowing_cache_evicts_only_the_first_key() {
    let cache: FifoCache<usize, usize> = FifoCache::new(CACHE_MAX_SIZE);

    for key in 0..=CACHE_MAX_SIZE {
        cache.insert(key, key * 10);
    }

    assert_eq!(cache.len(), CACHE_MAX_SIZE);
    assert!(!cache.contains(&0));
    assert!((1..=CACHE_MAX_SIZE).all(|key| cache.contains(&key)));
}

#[test]
fn test_cross_domain_confidence_boundary() {
    let at = classify_confidence(0.30, 0.30, true);
    let past = classify_confidence(0.300001, 0.30, true);

    assert_eq!(at.level, ConfidenceLevel::PossibleMatch);
    assert_eq!(past.level, ConfidenceLevel::WeakMatch);
}

fn corpus_fixture(mock: &MockEmbeddingProvider) -> InMemoryCorpus {
    let records = [("r1", 35.0), ("r2", 5.0), ("r3", 70.0), ("r4", 15.0), ("r5", 50.0)]
        .into_iter()
        .map(|(id, degrees)| {
            let photo = format!("photo-{id}").into_bytes();
            mock.set_vector(&photo, angled(degrees));
            CorpusRecord::new(id, format!("{id}.png"), photo)
        })
        .collect();
    InMemoryCorpus::new(records)
}

#[tokio::test]
async fn test_search_returns_best_three_in_order() {
    let mock = MockEmbeddingProvider::new().with_vector(b"probe", angled(0.0));
    let corpus = corpus_fixture(&mock);
    let ranker = CandidateRanker::new(mock_pipeline(mock, 32));

    let outcome = ranker
        .search(
            &ImageInput::new(b"probe".to_vec()),
            &corpus,
            &SearchOptions::default().top_k(3),
        )
        .await
        .unwrap();

    let ranked: Vec<_> = outcome
        .matches
        .iter()
        .map(|m| (m.rank, m.record.id.as_str()))
        .collect();
    assert_eq!(ranked, vec![(1, "r2"), (2, "r4"), (3, "r1")]);
}

#[tokio::test]
async fn test_one_failing_record_does_not_fail_search() {
    let mock = MockEmbeddingProvider::new().with_vector(b"probe", angled(0.0));
    let corpus = corpus_fixture(&mock);
    mock.set_failure(b"photo-r4");
    let ranker = CandidateRanker::new(mock_pipeline(mock, 32));

    let outcome = ranker
        .search(
            &ImageInput::new(b"probe".to_vec()),
            &corpus,
            &SearchOptions::default().top_k(5),
        )
        .await
        .unwrap();

    assert_eq!(outcome.total_matches(), 4);
    assert_eq!(outcome.failed_records, 1);
    assert!(outcome.matches.iter().all(|m| m.record.id != "r4"));
}
