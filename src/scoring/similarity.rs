/// Cosine similarity accumulated in `f64`.
///
/// Returns 0.0 for empty input, mismatched lengths, or a zero-norm vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (&av, &bv)| {
                let av = f64::from(av);
                let bv = f64::from(bv);
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Similarity clamped to `[0, 1]`; anti-correlated embeddings count as unrelated.
#[inline]
pub fn clamp_similarity(similarity: f64) -> f64 {
    if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(0.0, 1.0)
    }
}

/// Cosine distance in `[0, 1]`.
#[inline]
pub fn distance_from_similarity(similarity: f64) -> f64 {
    1.0 - clamp_similarity(similarity)
}

/// `(similarity, distance)` for two embeddings, both in `[0, 1]`.
pub fn score_pair(a: &[f32], b: &[f32]) -> (f64, f64) {
    let similarity = clamp_similarity(cosine_similarity(a, b));
    (similarity, 1.0 - similarity)
}
