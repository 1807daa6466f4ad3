//! Local lexical retrieval over project files: identifier tokenizing, tf-idf
//! vectors and cosine ranking, with a cacheable idf + snippet state.

pub mod index;
pub mod persist;
pub mod retrieval;
pub mod search;
pub mod tokenizer;

pub use index::{Category, Document, IndexSnapshot, IndexStats, InputDocument};
pub use persist::IndexState;
pub use retrieval::RetrievalIndex;
pub use search::{SearchHit, DEFAULT_LIMIT};
