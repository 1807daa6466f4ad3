use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Number of leading characters of a document kept as its display snippet.
pub const SNIPPET_CHARS: usize = 200;
pub const SNIPPET_ELLIPSIS: &str = "...";

/// Extensions treated as plain text regardless of category.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Code,
    Text,
    Other,
    Binary,
}

/// A file handed to an index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDocument {
    pub path: String,
    pub content: String,
    pub category: Category,
}

impl InputDocument {
    pub fn new(path: impl Into<String>, content: impl Into<String>, category: Category) -> Self {
        Self { path: path.into(), content: content.into(), category }
    }

    /// Only code, or files with a plain-text/markdown extension, get a vector.
    pub fn is_vectorizable(&self) -> bool {
        self.category == Category::Code || has_text_extension(&self.path)
    }
}

pub fn has_text_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| TEXT_EXTENSIONS.iter().any(|t| ext.eq_ignore_ascii_case(t)))
        .unwrap_or(false)
}

/// Sparse tf-idf vector of one vectorized document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub path: String,
    pub weights: HashMap<String, f32>,
    pub magnitude: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents handed to the build, the `N` of the idf formula.
    pub num_docs: usize,
    pub num_vectorized: usize,
    pub num_terms: usize,
}

/// One immutable, fully built index. Readers only ever see complete snapshots.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    pub documents: Vec<Document>,
    pub idf: HashMap<String, f32>,
    pub metadata: HashMap<String, String>,
    pub num_docs: usize,
}

impl IndexSnapshot {
    pub fn new() -> Self { Self::default() }

    pub fn stats(&self) -> IndexStats {
        IndexStats { num_docs: self.num_docs, num_vectorized: self.documents.len(), num_terms: self.idf.len() }
    }

    pub fn is_searchable(&self) -> bool { !self.documents.is_empty() }
}

/// Build a complete snapshot from scratch. Never fails: empty or token-less
/// documents end up with an empty vector and zero magnitude.
pub fn build_snapshot(documents: &[InputDocument]) -> IndexSnapshot {
    let num_docs = documents.len();

    // Last occurrence of a path wins.
    let mut last_index: HashMap<&str, usize> = HashMap::new();
    for (i, doc) in documents.iter().enumerate() {
        last_index.insert(doc.path.as_str(), i);
    }

    let mut tf_maps: Vec<(&InputDocument, HashMap<String, u32>)> = Vec::new();
    let mut df: HashMap<String, u32> = HashMap::new();
    for (i, doc) in documents.iter().enumerate() {
        if last_index.get(doc.path.as_str()) != Some(&i) {
            tracing::debug!(path = %doc.path, "duplicate path superseded by a later entry");
            continue;
        }
        if !doc.is_vectorizable() {
            continue;
        }
        let mut tf_counts: HashMap<String, u32> = HashMap::new();
        for term in tokenize(&doc.content) {
            *tf_counts.entry(term).or_insert(0) += 1;
        }
        for term in tf_counts.keys() {
            *df.entry(term.clone()).or_insert(0) += 1;
        }
        tf_maps.push((doc, tf_counts));
    }

    let n = num_docs as f32;
    let idf: HashMap<String, f32> = df
        .into_iter()
        .map(|(term, df_t)| {
            let weight = (n / (1.0 + df_t as f32)).ln();
            (term, weight)
        })
        .collect();

    let mut out_docs: Vec<Document> = Vec::with_capacity(tf_maps.len());
    let mut metadata: HashMap<String, String> = HashMap::with_capacity(tf_maps.len());
    for (doc, tf_counts) in tf_maps {
        // Sorted so the float sum is identical across rebuilds.
        let mut terms: Vec<(String, u32)> = tf_counts.into_iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let mut weights: HashMap<String, f32> = HashMap::with_capacity(terms.len());
        let mut sum_sq = 0.0f32;
        for (term, tf_raw) in terms {
            let w = tf_raw as f32 * idf.get(&term).copied().unwrap_or(0.0);
            sum_sq += w * w;
            weights.insert(term, w);
        }
        metadata.insert(doc.path.clone(), make_snippet(&doc.content));
        out_docs.push(Document { path: doc.path.clone(), weights, magnitude: sum_sq.sqrt() });
    }

    IndexSnapshot { documents: out_docs, idf, metadata, num_docs }
}

/// First `SNIPPET_CHARS` characters with whitespace runs collapsed, plus an ellipsis.
pub fn make_snippet(content: &str) -> String {
    let head: String = content.chars().take(SNIPPET_CHARS).collect();
    let mut snippet = String::with_capacity(head.len() + SNIPPET_ELLIPSIS.len());
    let mut in_space = false;
    for c in head.chars() {
        if c.is_whitespace() {
            if !in_space { snippet.push(' '); }
            in_space = true;
        } else {
            snippet.push(c);
            in_space = false;
        }
    }
    snippet.push_str(SNIPPET_ELLIPSIS);
    snippet
}
