//! Similarity scoring and deterministic result ordering.

use std::cmp::Ordering;

use crate::core::article::ScoredArticle;

/// Cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

/// Score desc, then date desc (newer first), then url asc.
pub fn compare(a: &ScoredArticle, b: &ScoredArticle) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.article.date.cmp(&a.article.date))
        .then_with(|| a.article.url.cmp(&b.article.url))
}

/// Sort in place and keep the best `k`.
pub fn rank(results: &mut Vec<ScoredArticle>, k: usize) {
    results.sort_by(compare);
    results.truncate(k);
}
