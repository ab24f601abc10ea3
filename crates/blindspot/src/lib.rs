//! Blindspot - Concept Novelty Retrieval
//!
//! Given topics a caller already knows, suggest one concept from a curated
//! corpus that is relevant enough to surface but as far as possible from
//! what they know. Concepts are embedded into a durable LanceDB index;
//! retrieval takes a window of nearest neighbours and picks the farthest one.

pub mod cli;
pub mod concept;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod ranker;
pub mod store;

pub use concept::Concept;
pub use config::Config;
pub use embeddings::{Embedder, EmbedderKind, HashingEmbedder};
pub use error::{BlindspotError, Stage, ValidationError};
pub use ingest::IngestionPipeline;
pub use ranker::{NoveltyRanker, DEFAULT_WINDOW};
pub use store::{ConceptStore, QueryResult};
