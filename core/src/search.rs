use crate::index::IndexSnapshot;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const DEFAULT_LIMIT: usize = 3;
/// Results must score strictly above this.
pub const MIN_SCORE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: String,
    pub score: f32,
    pub snippet: String,
}

/// Project a query into the snapshot's vector space. Terms the corpus has never
/// seen are dropped rather than added to the vocabulary.
pub fn query_weights(snapshot: &IndexSnapshot, query: &str) -> BTreeMap<String, f32> {
    let mut tf_q_raw: BTreeMap<String, u32> = BTreeMap::new();
    for term in tokenize(query) {
        *tf_q_raw.entry(term).or_insert(0) += 1;
    }
    tf_q_raw
        .into_iter()
        .filter_map(|(term, tf)| {
            let idf = *snapshot.idf.get(&term)?;
            Some((term, tf as f32 * idf))
        })
        .collect()
}

/// Rank the snapshot's documents by cosine similarity to `query`.
pub fn search(snapshot: &IndexSnapshot, query: &str, limit: usize) -> Vec<SearchHit> {
    let q_weights = query_weights(snapshot, query);
    let q_norm = q_weights.values().map(|w| w * w).sum::<f32>().sqrt();
    // Empty or fully out-of-vocabulary query
    if q_norm == 0.0 || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(&str, f32)> = Vec::new();
    for doc in &snapshot.documents {
        if doc.magnitude == 0.0 {
            continue;
        }
        let dot: f32 = q_weights
            .iter()
            .filter_map(|(term, q_w)| doc.weights.get(term).map(|d_w| q_w * d_w))
            .sum();
        let score = (dot / (q_norm * doc.magnitude)).min(1.0);
        if score > MIN_SCORE {
            scored.push((doc.path.as_str(), score));
        }
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(b.0)));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(path, score)| SearchHit {
            path: path.to_string(),
            score,
            snippet: snapshot.metadata.get(path).cloned().unwrap_or_default(),
        })
        .collect()
}
